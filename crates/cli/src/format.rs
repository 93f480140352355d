//! Output → printable lines.
//!
//! - keys: one per line
//! - entries: `key value`
//! - ordered entries: an `Order by <metric>` header, then `key: value`

use crate::run::Output;

pub fn lines(output: &Output) -> Vec<String> {
    match output {
        Output::Keys(keys) => keys.clone(),
        Output::Entries(entries) => entries
            .iter()
            .map(|(key, value)| format!("{} {}", key, value))
            .collect(),
        Output::Ordered { metric, entries } => std::iter::once(format!("Order by {}", metric))
            .chain(
                entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value)),
            )
            .collect(),
    }
}
