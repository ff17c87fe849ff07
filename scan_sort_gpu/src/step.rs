//! Iterators over the strides of a multi-pass scan.
//!
//! Pass loops on both sides of the device boundary are written as
//! `for offset in mult_step(1, 2).take_while(|&o| o < n)`, so the number of
//! passes only ever depends on `n`.

#[derive(Debug, Clone)]
pub struct MultStep {
    factor: usize,
    next: Option<usize>,
}

impl Iterator for MultStep {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next?;
        self.next = next.checked_mul(self.factor);
        Some(next)
    }
}

/// Returns an iterator that generates numbers by repeatedly multiplying by the
/// given factor. The iterator ends instead of overflowing.
pub fn mult_step(init: usize, factor: usize) -> MultStep {
    MultStep {
        factor,
        next: Some(init),
    }
}

#[derive(Debug, Clone)]
pub struct DivStep {
    denom: usize,
    next: usize,
}

impl Iterator for DivStep {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }
        let next = self.next;
        self.next /= self.denom;
        Some(next)
    }
}

/// Returns an iterator that generates numbers by repeatedly dividing by the
/// given denominator. Zero is never yielded.
pub fn div_step(init: usize, denom: usize) -> DivStep {
    DivStep { denom, next: init }
}

/// Number of passes `mult_step(1, 2)` makes below `n`, i.e. `ceil(log2 n)`.
pub fn pass_count(n: usize) -> usize {
    mult_step(1, 2).take_while(|&offset| offset < n).count()
}
