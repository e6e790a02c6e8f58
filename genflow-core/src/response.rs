//! Response extraction

use genflow_spec::error::{GenflowError, Result};
use genflow_spec::types::{GenerateResponse, Part};

/// Concatenate the text parts of a response, in order, with no separator.
///
/// Media parts are skipped. A response with no text part at all is an error;
/// an empty text part still counts and yields `""`.
pub fn extract_text(response: &GenerateResponse) -> Result<String> {
    let mut texts = response
        .message
        .content
        .iter()
        .filter_map(Part::as_text)
        .peekable();
    if texts.peek().is_none() {
        return Err(GenflowError::NoTextContent);
    }
    Ok(texts.collect())
}

/// Text parts of a response, one entry per part
pub fn text_parts(response: &GenerateResponse) -> Vec<&str> {
    response
        .message
        .content
        .iter()
        .filter_map(Part::as_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genflow_spec::types::{Message, Role, encode};

    fn response(parts: Vec<Part>) -> GenerateResponse {
        GenerateResponse::new(Message::new(Role::Model, parts))
    }

    #[test]
    fn joins_text_in_order_skipping_media() {
        let media = encode(b"png", "image/png").unwrap();
        let resp = response(vec![
            Part::text("A"),
            Part::media(media),
            Part::text("B"),
        ]);
        assert_eq!(extract_text(&resp).unwrap(), "AB");
        assert_eq!(text_parts(&resp), vec!["A", "B"]);
    }

    #[test]
    fn media_only_is_an_error() {
        let media = encode(b"png", "image/png").unwrap();
        let resp = response(vec![Part::media(media)]);
        assert_eq!(extract_text(&resp), Err(GenflowError::NoTextContent));
    }

    #[test]
    fn no_parts_is_an_error() {
        assert_eq!(extract_text(&response(vec![])), Err(GenflowError::NoTextContent));
    }

    #[test]
    fn empty_text_part_is_still_text() {
        assert_eq!(extract_text(&response(vec![Part::text("")])).unwrap(), "");
    }
}
