use crate::encoding::is_mismatch;
use crate::error::EncoderError;

fn check_lengths(query: &[u8], target: &[u8]) -> Result<(), EncoderError> {
    if query.len() != target.len() {
        return Err(EncoderError::Comparison {
            left: query.len(),
            right: target.len(),
        });
    }
    Ok(())
}

// Per-site mismatch count. Compares every site; a wildcard in either sequence
// always counts, even against another wildcard.
pub fn count_mismatches<Q, T>(query: Q, target: T) -> Result<usize, EncoderError>
where
    Q: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    let (query, target) = (query.as_ref(), target.as_ref());
    check_lengths(query, target)?;

    let mut d: usize = 0;
    for i in 0..target.len() {
        if is_mismatch(query[i], target[i]) {
            d += 1;
        }
    }
    Ok(d)
}

// Same answer as count_mismatches(..) <= k, but stops at the first site that
// takes the count past k.
pub fn within_k_mismatches<Q, T>(query: Q, target: T, k: usize) -> Result<bool, EncoderError>
where
    Q: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    let (query, target) = (query.as_ref(), target.as_ref());
    check_lengths(query, target)?;

    let mut d: usize = 0;
    for i in 0..target.len() {
        if is_mismatch(query[i], target[i]) {
            d += 1;
            if d > k {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatches() {
        assert_eq!(count_mismatches("AA", "GA"), Ok(1));
        assert_eq!(count_mismatches("ATGATG", "ATTATT"), Ok(2));
        assert_eq!(count_mismatches("", ""), Ok(0));
    }

    #[test]
    fn test_count_mismatches_wildcard() {
        assert_eq!(count_mismatches("ANA", "ANA"), Ok(1));
        assert_eq!(count_mismatches("NNN", "NNN"), Ok(3));
        assert_eq!(count_mismatches("ACG", "NCG"), Ok(1));
    }

    #[test]
    fn test_count_mismatches_length() {
        assert_eq!(
            count_mismatches("AA", "AAA"),
            Err(EncoderError::Comparison { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_within_k_mismatches() {
        assert_eq!(within_k_mismatches("AA", "AG", 1), Ok(true));
        assert_eq!(within_k_mismatches("AA", "AG", 0), Ok(false));
        assert_eq!(within_k_mismatches("NN", "NN", 1), Ok(false));
        assert_eq!(within_k_mismatches("NN", "NN", 2), Ok(true));
        assert_eq!(
            within_k_mismatches("ACGT", "ACG", 4),
            Err(EncoderError::Comparison { left: 4, right: 3 })
        );
    }

    #[test]
    fn test_within_k_matches_count() {
        let pairs = [("ACGTN", "ACGTA"), ("AAAAA", "TTTTT"), ("GATTA", "GATTA"), ("NACGT", "TACGN")];
        for (a, b) in pairs {
            let n = count_mismatches(a, b).unwrap();
            for k in 0..=6 {
                assert_eq!(within_k_mismatches(a, b, k).unwrap(), n <= k);
            }
        }
    }
}
