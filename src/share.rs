// Share/export helpers. Image composition happens in the presentation layer;
// this only produces the text and names it needs.

use serde::{Deserialize, Serialize};

use crate::combination::Combination;

pub const SHARE_TITLE: &str = "엉뚱한 영감 한 스푼";

/// Payload for a platform share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

/// `problem × keyword × metaphor`, followed by a blank line and the
/// description when there is one.
pub fn plain_text(combination: &Combination) -> String {
    let mut text = format!(
        "{} × {} × {}",
        combination.problem, combination.keyword, combination.metaphor
    );
    if let Some(description) = combination.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str("\n\n");
        text.push_str(description);
    }
    text
}

pub fn share_payload(combination: &Combination) -> SharePayload {
    SharePayload {
        title: SHARE_TITLE.to_string(),
        text: plain_text(combination),
    }
}

/// File name for an exported card image
pub fn export_file_name(combination: &Combination) -> String {
    format!("inspiration-{}.png", combination.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_without_description() {
        let combination = Combination::new("외로움", "식물", "등대");
        assert_eq!(plain_text(&combination), "외로움 × 식물 × 등대");
    }

    #[test]
    fn test_plain_text_with_description() {
        let combination = Combination::new("A", "B", "C").with_description("설명입니다.");
        assert_eq!(plain_text(&combination), "A × B × C\n\n설명입니다.");
    }

    #[test]
    fn test_share_payload_and_export_name() {
        let combination = Combination::new("A", "B", "C").at(1_760_000_000_000);

        let payload = share_payload(&combination);
        assert_eq!(payload.title, "엉뚱한 영감 한 스푼");
        assert_eq!(payload.text, "A × B × C");

        assert_eq!(export_file_name(&combination), "inspiration-1760000000000.png");
    }
}
