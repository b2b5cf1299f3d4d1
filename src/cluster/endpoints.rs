// snapshottool/src/cluster/endpoints.rs
use tracing::warn;
use url::Url;

use crate::errors::{AppError, Result};

pub const NODE_SET_SIZE: usize = 3;
const DEFAULT_PORT: u16 = 9200;

/// Pads a configured seed list to exactly three entries.
///
/// * one seed: repeated three times (single-node or test setups), with a warning
/// * two seeds: the third slot repeats the *first* seed, not the second. This mirrors
///   the long-standing behaviour of the tool and may be an oversight; kept as is.
/// * three seeds: returned unchanged
pub fn resolve(seeds: &[String]) -> Result<[String; NODE_SET_SIZE]> {
    match seeds {
        [] => Err(AppError::config("at least one seed node must be configured")),
        [only] => {
            warn!(
                seed = %only,
                "Only one seed node configured, falling back to a single node (test or single-node setup?)"
            );
            Ok([only.clone(), only.clone(), only.clone()])
        }
        [first, second] => Ok([first.clone(), second.clone(), first.clone()]),
        [first, second, third] => Ok([first.clone(), second.clone(), third.clone()]),
        _ => Err(AppError::config(format!(
            "at most {} seed nodes are supported, got {}",
            NODE_SET_SIZE,
            seeds.len()
        ))),
    }
}

/// Turns a seed such as `es-1`, `es-1:9201` or `https://es-1:9243` into a base URL.
pub fn seed_to_url(seed: &str) -> Result<Url> {
    let seed = seed.trim();
    let with_scheme = if seed.contains("://") {
        seed.to_string()
    } else {
        format!("http://{}", seed)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| AppError::config(format!("invalid seed node '{}': {}", seed, e)))?;
    if url.host_str().is_none() {
        return Err(AppError::config(format!("seed node '{}' has no host", seed)));
    }
    if !seed.contains("://") && url.port().is_none() {
        url.set_port(Some(DEFAULT_PORT))
            .map_err(|_| AppError::config(format!("cannot set port on seed node '{}'", seed)))?;
    }
    // Request paths are appended below whatever prefix the seed carries.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
