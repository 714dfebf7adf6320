//! Gradual weight updates linearly interpolated over a block range.

use {crate::error::Error, number::Bfp};

/// A stored gradual update. Once the end block is reached the weights are
/// exactly the end weights and further pokes change nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GradualUpdate {
    start_weights: Vec<Bfp>,
    end_weights: Vec<Bfp>,
    start_block: u64,
    end_block: u64,
    /// Set by the first poke at or after the end block. A finished update
    /// stays stored but no longer blocks manual weight changes.
    finished: bool,
}

impl GradualUpdate {
    pub fn new(
        start_weights: Vec<Bfp>,
        end_weights: Vec<Bfp>,
        start_block: u64,
        end_block: u64,
    ) -> Result<Self, Error> {
        if end_block < start_block {
            return Err(Error::InvalidRange {
                start: start_block,
                end: end_block,
            });
        }
        if start_weights.len() != end_weights.len() {
            return Err(Error::LengthMismatch {
                expected: start_weights.len(),
                actual: end_weights.len(),
            });
        }
        Ok(Self {
            start_weights,
            end_weights,
            start_block,
            end_block,
            finished: false,
        })
    }

    pub fn start_weights(&self) -> &[Bfp] {
        &self.start_weights
    }

    pub fn end_weights(&self) -> &[Bfp] {
        &self.end_weights
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn end_block(&self) -> u64 {
        self.end_block
    }

    pub fn is_terminal(&self, block: u64) -> bool {
        block >= self.end_block
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Weights at `block`:
    ///
    /// ```text
    /// w(t) = start + (end - start) * clamp((t - start_block) / (end_block - start_block), 0, 1)
    /// ```
    ///
    /// The delta is multiplied by the elapsed blocks before dividing by the
    /// period, so both boundaries are hit exactly.
    pub fn weights_at(&self, block: u64) -> Result<Vec<Bfp>, Error> {
        if self.is_terminal(block) {
            return Ok(self.end_weights.clone());
        }
        if block <= self.start_block {
            return Ok(self.start_weights.clone());
        }

        let elapsed = Bfp::from(block - self.start_block);
        let period = Bfp::from(self.end_block - self.start_block);
        self.start_weights
            .iter()
            .zip(&self.end_weights)
            .map(|(&start, &end)| {
                let weight = if end >= start {
                    start.add(end.sub(start)?.mul_div_down(elapsed, period)?)?
                } else {
                    start.sub(start.sub(end)?.mul_div_down(elapsed, period)?)?
                };
                Ok(weight)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, number::bfp};

    fn reversal() -> GradualUpdate {
        GradualUpdate::new(
            vec![bfp!("4"), bfp!("36")],
            vec![bfp!("36"), bfp!("4")],
            0,
            15,
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(
            GradualUpdate::new(vec![bfp!("1")], vec![bfp!("2")], 10, 9),
            Err(Error::InvalidRange { start: 10, end: 9 })
        );
    }

    #[test]
    fn rejects_length_mismatch() {
        assert_eq!(
            GradualUpdate::new(vec![bfp!("1"), bfp!("1")], vec![bfp!("2")], 0, 9),
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn boundaries_are_exact() {
        let update = reversal();
        assert_eq!(update.weights_at(0).unwrap(), vec![bfp!("4"), bfp!("36")]);
        assert_eq!(update.weights_at(15).unwrap(), vec![bfp!("36"), bfp!("4")]);
        assert_eq!(update.weights_at(1_000).unwrap(), vec![bfp!("36"), bfp!("4")]);
        assert!(!update.is_terminal(14));
        assert!(update.is_terminal(15));
    }

    #[test]
    fn interpolates_linearly() {
        let update = reversal();
        assert_eq!(
            update.weights_at(5).unwrap(),
            vec![bfp!("14.666666666666666666"), bfp!("25.333333333333333334")]
        );
        assert_eq!(update.weights_at(3).unwrap(), vec![bfp!("10.4"), bfp!("29.6")]);

        let mut previous = update.weights_at(0).unwrap();
        for block in 1..=15 {
            let weights = update.weights_at(block).unwrap();
            assert!(weights[0] > previous[0]);
            assert!(weights[1] < previous[1]);
            previous = weights;
        }
    }

    #[test]
    fn holds_start_weights_before_the_start_block() {
        let update =
            GradualUpdate::new(vec![bfp!("10"), bfp!("10")], vec![bfp!("20"), bfp!("5")], 100, 200)
                .unwrap();
        assert_eq!(update.weights_at(50).unwrap(), vec![bfp!("10"), bfp!("10")]);
        assert_eq!(update.weights_at(150).unwrap(), vec![bfp!("15"), bfp!("7.5")]);
    }

    #[test]
    fn empty_range_is_immediately_terminal() {
        let update =
            GradualUpdate::new(vec![bfp!("10")], vec![bfp!("20")], 7, 7).unwrap();
        assert!(update.is_terminal(7));
        assert_eq!(update.weights_at(7).unwrap(), vec![bfp!("20")]);
        assert_eq!(update.weights_at(3).unwrap(), vec![bfp!("10")]);
    }
}
