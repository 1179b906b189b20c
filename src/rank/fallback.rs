// src/rank/fallback.rs
//! Deterministic digest: the first entries in discovery order, no re-sorting.

use crate::normalize::Opportunity;

pub const FALLBACK_LIMIT: usize = 5;

const FALLBACK_HEADER: &str = "Unable to summarize. Here are the raw opportunities in the order they were found:";

/// Select the first `min(5, n)` opportunities, order untouched.
pub fn select(opportunities: &[Opportunity]) -> Vec<Opportunity> {
    opportunities.iter().take(FALLBACK_LIMIT).cloned().collect()
}

pub fn render(entries: &[Opportunity]) -> String {
    let mut out = String::from(FALLBACK_HEADER);
    out.push_str("\n\n");
    for e in entries {
        out.push_str(&render_block(e));
        out.push('\n');
    }
    out
}

/// Fixed five-field block.
pub fn render_block(e: &Opportunity) -> String {
    format!(
        "Title: {}\nLink: {}\nDescription: {}\nCost: {}\nPrerequisites: {}\n",
        e.title, e.link, e.description, e.cost, e.prerequisites
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawCandidate;

    fn opp(t: &str) -> Opportunity {
        Opportunity::from(RawCandidate {
            title: Some(t.to_string()),
            ..RawCandidate::new("test")
        })
    }

    #[test]
    fn keeps_order_and_truncates() {
        let opps: Vec<Opportunity> = ["e", "d", "c", "b", "a", "z", "y"].iter().map(|t| opp(t)).collect();
        let picked = select(&opps);
        let titles: Vec<&str> = picked.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn block_has_all_five_fields() {
        let block = render_block(&opp("MRI physics"));
        assert_eq!(
            block,
            "Title: MRI physics\nLink: No link\nDescription: No description available\n\
             Cost: Varies (Check link)\nPrerequisites: Check link for details\n"
        );
    }
}
