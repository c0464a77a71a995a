//! Slitlet range specifications.
//!
//! A specification is a list of blank-separated `n1[,n2[,step]]` tuples:
//!
//! - `n1`          → slitlet `n1`
//! - `n1,n2`       → `n1..=n2`
//! - `n1,n2,step`  → `n1, n1+step, …` while `≤ n2`
//!
//! Blanks around commas are ignored, so `"2 , 10, 2"` is a single tuple.

use std::collections::BTreeSet;

use crate::error::AppError;

/// Parse `spec` into a sorted, duplicate-free list of slitlet numbers.
///
/// Every expanded value must lie in `[min, max]`; the first one that does not
/// aborts the whole parse with a range error. A descending pair such as `5,3`
/// is well formed and contributes nothing, so the result may be empty.
pub fn parse(spec: &str, min: usize, max: usize) -> Result<Vec<usize>, AppError> {
    let normalized = spec.split(',').map(str::trim).collect::<Vec<_>>().join(",");

    let mut selected = BTreeSet::new();
    let mut n_tokens = 0usize;
    for token in normalized.split_whitespace() {
        n_tokens += 1;
        let (n1, n2, step) = parse_token(token)?;

        let mut i = n1;
        while i <= n2 {
            if i < min as i64 || i > max as i64 {
                return Err(AppError::range(format!(
                    "Slitlet number {i} out of range [{min}, {max}] (token '{token}')."
                )));
            }
            selected.insert(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }

    if n_tokens == 0 {
        return Err(AppError::parse("Empty slitlet specification."));
    }

    Ok(selected.into_iter().collect())
}

fn parse_token(token: &str) -> Result<(i64, i64, i64), AppError> {
    let parts: Vec<&str> = token.split(',').collect();
    let values = parts
        .iter()
        .map(|p| {
            p.parse::<i64>()
                .map_err(|_| AppError::parse(format!("Invalid integer '{p}' in slitlet range '{token}'.")))
        })
        .collect::<Result<Vec<i64>, AppError>>()?;

    let (n1, n2, step) = match values.as_slice() {
        [n1] => (*n1, *n1, 1),
        [n1, n2] => (*n1, *n2, 1),
        [n1, n2, step] => (*n1, *n2, *step),
        _ => {
            return Err(AppError::parse(format!(
                "Unexpected slitlet range '{token}': expected n1[,n2[,step]]."
            )));
        }
    };

    if step <= 0 {
        return Err(AppError::parse(format!(
            "Step must be a positive integer in slitlet range '{token}'."
        )));
    }

    Ok((n1, n2, step))
}
