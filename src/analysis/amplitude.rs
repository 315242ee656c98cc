//! Peak-hold loudness from a byte spectrum.

/// Reduces a spectrum to its loudest bin.
///
/// Peak rather than mean, so short loud frequencies still move the circle.
/// An empty spectrum is silent.
pub fn reduce(buffer: &[u8]) -> u8 {
    buffer.iter().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_takes_maximum_not_mean() {
        assert_eq!(reduce(&[10, 250, 0, 5]), 250);
    }

    #[test]
    fn test_reduce_edges() {
        assert_eq!(reduce(&[]), 0);
        assert_eq!(reduce(&[0; 128]), 0);
        assert_eq!(reduce(&[255, 3]), 255);
    }
}
