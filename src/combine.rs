//! Merges selected lists into one hosts-format block list.

use crate::lists::ListStore;
use crate::selector::Selector;

/// Address every generated rule resolves to.
const NULL_ROUTE: &str = "0.0.0.0";

/// Build the block list for `selector`.
///
/// The result is a header comment naming the combination followed by one
/// `0.0.0.0 <domain>` line per distinct domain, sorted ascending. The output
/// depends only on the set of ids and the store contents.
pub fn combine_lists(store: &ListStore, selector: &Selector) -> String {
    let mut domains: Vec<&str> = selector
        .ids()
        .filter_map(|id| store.get(id))
        .flat_map(|set| set.iter())
        .collect();
    domains.sort_unstable();
    domains.dedup();

    let header = header_line(selector);
    let body_len: usize = domains
        .iter()
        .map(|d| NULL_ROUTE.len() + d.len() + 2)
        .sum();

    let mut out = String::with_capacity(header.len() + body_len);
    out.push_str(&header);
    for domain in domains {
        out.push_str(NULL_ROUTE);
        out.push(' ');
        out.push_str(domain);
        out.push('\n');
    }
    out
}

fn header_line(selector: &Selector) -> String {
    format!(
        "# uAdBlock generated block list ({})\n",
        selector.combination_id()
    )
}
