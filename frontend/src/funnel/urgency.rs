/// Social-proof counter shown on the funnel pages.
///
/// The numbers are made up: the counter starts from a fixed value and grows
/// by random increments on a timer. Nothing here reflects real purchases or
/// visitors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulatedCounter {
    value: u32,
    cap: Option<u32>,
    min_step: u32,
    max_step: u32,
}

impl SimulatedCounter {
    /// "People viewing" counter on the home page: +0..=2 per tick, unbounded.
    pub fn home() -> Self {
        Self {
            value: 127,
            cap: None,
            min_step: 0,
            max_step: 2,
        }
    }

    /// "Bought in the last two hours" counter on the result page: +1..=3 per tick.
    pub fn recent_buyers(cap: u32) -> Self {
        Self {
            value: 3,
            cap: Some(cap),
            min_step: 1,
            max_step: 3,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Advance using `roll` in `[0, 1)`, e.g. from `Math.random()`.
    pub fn bump(&mut self, roll: f64) -> u32 {
        let span = self.max_step - self.min_step + 1;
        let offset = ((roll.clamp(0.0, 0.999_999) * f64::from(span)) as u32).min(span - 1);
        let next = self.value + self.min_step + offset;
        self.value = match self.cap {
            Some(cap) => next.min(cap),
            None => next,
        };
        self.value
    }
}
