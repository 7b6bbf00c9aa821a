//! Card assembly stage.
//!
//! Wraps the synthesized body in the card envelope, attaches the
//! structured empty-result error when nothing usable was produced, and
//! selects the plain or template-and-data output shape.

use super::binding::DataBinder;
use crate::domain::card::{
    AdaptiveCard, CardError, CardFormat, CardNode, CardResponse, CardV2Payload,
};

pub(crate) struct CardAssembler;

impl CardAssembler {
    /// Builds the response document for one image.
    ///
    /// # Arguments
    ///
    /// * `body` - The ordered card body.
    /// * `had_elements` - Whether any detection survived normalization.
    /// * `format` - The output shape requested by the caller.
    pub(crate) fn assemble(
        &self,
        body: Vec<CardNode>,
        had_elements: bool,
        format: CardFormat,
    ) -> CardResponse {
        // "Nothing detected" and "everything deduplicated away" are
        // reported identically.
        let error = (body.is_empty() || !had_elements).then(CardError::empty_card);

        match format {
            CardFormat::Plain => CardResponse {
                card_json: Some(AdaptiveCard::new(body)),
                card_v2_json: None,
                error,
            },
            CardFormat::Template => {
                let mut templated = body;
                let data = DataBinder.extract(&mut templated);
                CardResponse {
                    card_json: None,
                    card_v2_json: Some(CardV2Payload {
                        data,
                        template: AdaptiveCard::new(templated),
                    }),
                    error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::EMPTY_CARD_CODE;

    fn toggle(title: &str) -> CardNode {
        CardNode::Toggle {
            title: title.to_string(),
        }
    }

    #[test]
    fn test_plain_format_populates_card_json() {
        let response = CardAssembler.assemble(vec![toggle("a")], true, CardFormat::Plain);

        assert!(response.error.is_none());
        assert!(response.card_v2_json.is_none());
        let card = response.card_json.unwrap();
        assert_eq!(card.body.len(), 1);
    }

    #[test]
    fn test_template_format_populates_card_v2_json() {
        let response = CardAssembler.assemble(vec![toggle("Opt in")], true, CardFormat::Template);

        assert!(response.card_json.is_none());
        let payload = response.card_v2_json.unwrap();
        assert_eq!(payload.data["toggle_0"], "Opt in");
        assert!(
            matches!(&payload.template.body[0], CardNode::Toggle { title } if title == "${toggle_0}")
        );
    }

    #[test]
    fn test_empty_body_reports_error_1000() {
        let response = CardAssembler.assemble(Vec::new(), true, CardFormat::Plain);

        let error = response.error.unwrap();
        assert_eq!(error.code, EMPTY_CARD_CODE);
        assert!(response.card_json.unwrap().body.is_empty());
    }

    #[test]
    fn test_no_surviving_elements_reports_error_1000() {
        let response = CardAssembler.assemble(Vec::new(), false, CardFormat::Template);

        assert_eq!(response.error.unwrap().code, 1000);
        let payload = response.card_v2_json.unwrap();
        assert!(payload.data.is_empty());
        assert!(payload.template.body.is_empty());
    }
}
