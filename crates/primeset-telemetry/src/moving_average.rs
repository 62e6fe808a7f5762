//! Fixed-window moving average

/// Circular buffer of the most recent samples
///
/// Only the last `window` samples are kept; older ones are overwritten.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: Vec<f64>,
    cursor: usize,
    filled: bool,
}

impl MovingAverage {
    /// Create an empty average over `window` samples (at least 1)
    pub fn new(window: usize) -> Self {
        Self {
            values: vec![0.0; window.max(1)],
            cursor: 0,
            filled: false,
        }
    }

    /// Overwrite the oldest sample
    pub fn add(&mut self, value: f64) {
        self.values[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.values.len();
        if self.cursor == 0 {
            self.filled = true;
        }
    }

    /// Mean over the filled slots, 0 when empty
    pub fn average(&self) -> f64 {
        let filled = self.len();
        if filled == 0 {
            return 0.0;
        }
        self.values[..filled].iter().sum::<f64>() / filled as f64
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        if self.filled {
            self.values.len()
        } else {
            self.cursor
        }
    }

    /// Whether no sample has been added yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity of the window
    pub fn window(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        let avg = MovingAverage::new(3);
        assert!(avg.is_empty());
        assert_eq!(avg.average(), 0.0);
    }

    #[test]
    fn test_partial_window() {
        let mut avg = MovingAverage::new(3);
        avg.add(1.0);
        avg.add(2.0);
        assert_eq!(avg.len(), 2);
        assert_eq!(avg.average(), 1.5);
    }

    #[test]
    fn test_oldest_sample_evicted() {
        let mut avg = MovingAverage::new(3);
        avg.add(1.0);
        avg.add(2.0);
        avg.add(3.0);
        assert_eq!(avg.average(), 2.0);

        avg.add(4.0);
        assert_eq!(avg.len(), 3);
        assert_eq!(avg.average(), 3.0);
    }

    #[test]
    fn test_zero_window_clamped() {
        let mut avg = MovingAverage::new(0);
        assert_eq!(avg.window(), 1);
        avg.add(5.0);
        avg.add(7.0);
        assert_eq!(avg.average(), 7.0);
    }
}
