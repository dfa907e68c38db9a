//! Fixed-size sample windows for the leak monitor
//!
//! A `SampleWindow<N>` holds the last `N` concentration samples in arrival
//! order. Pushing into a full window evicts the oldest sample. Storage is a
//! `heapless::Deque`, so a window lives inline in its owner.

use heapless::Deque;

use crate::time::Timestamp;

/// One valid concentration and when it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Concentration (ppm)
    pub ppm: f64,
    /// Observation time (ms)
    pub at: Timestamp,
}

/// The last `N` samples, oldest first
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    samples: Deque<Sample, N>,
}

impl<const N: usize> SampleWindow<N> {
    /// Empty window
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Append a sample, evicting the oldest one if the window is full
    pub fn push(&mut self, sample: Sample) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // N == 0 windows keep nothing
        let _ = self.samples.push_back(sample);
    }

    /// Samples held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Holds `N` samples
    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    /// First sample still held
    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    /// Most recent sample
    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Mean concentration, `None` when empty
    pub fn mean_ppm(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.ppm).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ppm: f64, at: Timestamp) -> Sample {
        Sample { ppm, at }
    }

    #[test]
    fn starts_empty() {
        let window: SampleWindow<4> = SampleWindow::new();
        assert!(window.is_empty());
        assert_eq!(window.mean_ppm(), None);
        assert!(window.oldest().is_none());
        assert!(window.newest().is_none());
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = SampleWindow::<3>::new();
        for (i, ppm) in [10.0, 20.0, 30.0, 40.0, 50.0].into_iter().enumerate() {
            window.push(sample(ppm, i as Timestamp * 100));
        }

        assert!(window.is_full());
        assert_eq!(window.len(), 3);
        assert_eq!(window.oldest(), Some(&sample(30.0, 200)));
        assert_eq!(window.newest(), Some(&sample(50.0, 400)));

        let held: [f64; 3] = {
            let mut it = window.iter().map(|s| s.ppm);
            [it.next().unwrap(), it.next().unwrap(), it.next().unwrap()]
        };
        assert_eq!(held, [30.0, 40.0, 50.0]);
    }

    #[test]
    fn mean_of_held_samples() {
        let mut window = SampleWindow::<4>::new();
        window.push(sample(1.0, 0));
        window.push(sample(2.0, 1));
        window.push(sample(6.0, 2));
        assert_eq!(window.mean_ppm(), Some(3.0));

        window.clear();
        assert!(window.is_empty());
    }
}
