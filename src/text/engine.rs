use std::borrow::Cow;

use crate::foundation::color::Rgba8;
use crate::foundation::error::{ReelError, ReelResult};

/// Generic family used when no custom typeface could be registered.
pub(crate) const FALLBACK_FAMILY: &str = "sans-serif";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for measuring and shaping caption lines with Parley.
///
/// Holds one typeface family for the whole run: either the custom font registered at
/// construction, or [`FALLBACK_FAMILY`].
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
}

impl TextLayoutEngine {
    /// Build an engine, registering `custom_font` when given.
    ///
    /// Font bytes that do not register a family fall back to the default family with a warning.
    pub(crate) fn new(custom_font: Option<&[u8]>) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let family = match custom_font {
            Some(bytes) => match register_family(&mut font_ctx, bytes) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(error = %e, "custom typeface unusable, using default family");
                    FALLBACK_FAMILY.to_owned()
                }
            },
            None => FALLBACK_FAMILY.to_owned(),
        };
        tracing::debug!(family = %family, "caption typeface resolved");

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        }
    }

    /// Family name used for all layouts.
    pub(crate) fn family(&self) -> &str {
        &self.family
    }

    /// Shape a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "caption font size must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Advance width of `text`, trailing whitespace included.
    pub(crate) fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        match self.layout_line(text, size_px, TextBrushRgba8::default()) {
            Ok(layout) => layout.full_width(),
            Err(_) => 0.0,
        }
    }
}

fn register_family(font_ctx: &mut parley::FontContext, bytes: &[u8]) -> ReelResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ReelError::load("no font families registered from font bytes"))?;

    Ok(font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ReelError::load("registered font family has no name"))?
        .to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
