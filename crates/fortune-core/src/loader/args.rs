//! Parsing of `[N%] path` argument lists into probability paths

use crate::error::{FortuneError, Result};

use super::ProbabilityPath;

/// Turn `["30%", "/a", "/b", "70%", "/c"]` into paths carrying their share.
///
/// A percentage applies to the path right after it. Paths without one get 0,
/// leaving their share for the selector to settle.
pub fn parse_probability_args<I, S>(args: I) -> Result<Vec<ProbabilityPath>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = Vec::new();
    let mut pending: Option<f32> = None;

    for arg in args {
        let arg = arg.as_ref();
        if let Some(percentage) = parse_percentage(arg)? {
            if pending.is_some() {
                return Err(FortuneError::InvalidArgument(format!(
                    "percentage {} follows another percentage",
                    arg
                )));
            }
            pending = Some(percentage);
            continue;
        }
        paths.push(ProbabilityPath::new(arg, pending.take().unwrap_or(0.0)));
    }

    if let Some(percentage) = pending {
        return Err(FortuneError::InvalidArgument(format!(
            "percentage {}% is not followed by a path",
            percentage
        )));
    }

    Ok(paths)
}

fn parse_percentage(arg: &str) -> Result<Option<f32>> {
    let Some(number) = arg.strip_suffix('%') else {
        return Ok(None);
    };
    let Ok(percentage) = number.parse::<f32>() else {
        return Ok(None);
    };
    if !(0.0..=100.0).contains(&percentage) {
        return Err(FortuneError::InvalidArgument(format!(
            "percentage {} is outside 0-100",
            arg
        )));
    }
    Ok(Some(percentage))
}
