//! Image Token Calculator (C14): provider-specific token formulas for an
//! image content block's pixel dimensions.

/// The provider whose pricing formula applies to an image block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProvider {
    Anthropic,
    OpenAiHigh,
    OpenAiLow,
    OpenAiAuto,
    Gemini,
    /// Conservative `max` of every formula above; used when the provider
    /// is unknown.
    Default,
}

const UNKNOWN_DIM: u32 = 1024;

/// Token cost of an image of `width` x `height` pixels (`None` defaults to
/// 1024x1024, per spec) under `provider`'s formula.
pub fn image_tokens(provider: ImageProvider, width: Option<u32>, height: Option<u32>) -> usize {
    let w = width.unwrap_or(UNKNOWN_DIM);
    let h = height.unwrap_or(UNKNOWN_DIM);

    match provider {
        ImageProvider::Anthropic => anthropic_tokens(w, h),
        ImageProvider::OpenAiHigh => openai_high_tokens(w, h),
        ImageProvider::OpenAiLow => 85,
        ImageProvider::OpenAiAuto => {
            if w <= 512 && h <= 512 {
                85
            } else {
                openai_high_tokens(w, h)
            }
        }
        ImageProvider::Gemini => 258,
        ImageProvider::Default => [anthropic_tokens(w, h), openai_high_tokens(w, h), 258]
            .into_iter()
            .max()
            .unwrap_or(258),
    }
}

fn anthropic_tokens(width: u32, height: u32) -> usize {
    let mut w = width.min(8192) as f64;
    let mut h = height.min(8192) as f64;
    let megapixels = (w * h) / 1_000_000.0;
    if megapixels > 1.15 {
        let scale = (1.15 / megapixels).sqrt();
        w *= scale;
        h *= scale;
    }
    (((w * h) / 750.0).ceil() as usize).max(1)
}

fn openai_high_tokens(width: u32, height: u32) -> usize {
    let (mut w, mut h) = (width as f64, height as f64);

    let long = w.max(h);
    if long > 2048.0 {
        let scale = 2048.0 / long;
        w *= scale;
        h *= scale;
    }

    let short = w.min(h);
    if short > 768.0 {
        let scale = 768.0 / short;
        w *= scale;
        h *= scale;
    }

    let tiles_w = (w / 512.0).ceil().max(1.0);
    let tiles_h = (h / 512.0).ceil().max(1.0);
    let tiles = (tiles_w * tiles_h) as usize;
    85 + tiles * 170
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anthropic_formula_clamps_and_scales() {
        let tokens = image_tokens(ImageProvider::Anthropic, Some(1568), Some(1568));
        assert!(tokens > 0);
    }

    #[test]
    fn openai_low_is_fixed() {
        assert_eq!(image_tokens(ImageProvider::OpenAiLow, Some(4000), Some(4000)), 85);
    }

    #[test]
    fn openai_auto_picks_low_for_small_images() {
        assert_eq!(image_tokens(ImageProvider::OpenAiAuto, Some(400), Some(400)), 85);
        assert!(image_tokens(ImageProvider::OpenAiAuto, Some(2048), Some(2048)) > 85);
    }

    #[test]
    fn gemini_is_fixed_258() {
        assert_eq!(image_tokens(ImageProvider::Gemini, Some(1), Some(1)), 258);
    }

    #[test]
    fn unknown_dimensions_default_to_1024_square() {
        let with_none = image_tokens(ImageProvider::Anthropic, None, None);
        let with_explicit = image_tokens(ImageProvider::Anthropic, Some(1024), Some(1024));
        assert_eq!(with_none, with_explicit);
    }

    #[test]
    fn default_provider_is_conservative_max() {
        let default_tokens = image_tokens(ImageProvider::Default, Some(2048), Some(2048));
        let anthropic = image_tokens(ImageProvider::Anthropic, Some(2048), Some(2048));
        let openai = image_tokens(ImageProvider::OpenAiHigh, Some(2048), Some(2048));
        assert_eq!(default_tokens, anthropic.max(openai).max(258));
    }
}
