//! SVG intermediate representation of a card.
//!
//! The card view is written out as an SVG document that resvg rasterizes.
//! Text shadows become a filter chain, the background image is drawn with
//! `slice` scaling (cover, centered).

use std::fmt::Write;

use card_core::catalog::TextAlign;
use card_core::{Background, CardView, TextBlock};

/// Filter id for the text shadow chain.
const EFFECT_FILTER_ID: &str = "text-effect";

/// Render a card view to an SVG string at the given output scale.
#[must_use]
pub fn render_svg(view: &CardView, scale: f32) -> String {
    let view_w = view.geometry.width;
    let view_h = view.geometry.height;
    let (out_w, out_h) = output_size(view, scale);

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
    );

    match &view.background {
        Background::Solid { color } => {
            let _ = write!(
                svg,
                "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
                escape_xml(color.as_str()),
            );
        }
        Background::Image { image } => {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{view_w}\" height=\"{view_h}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
                escape_xml(&image.to_data_uri()),
            );
        }
    }

    if let Some(block) = &view.text {
        render_text_block(&mut svg, block, view_w, view_h);
    }

    svg.push_str("</svg>");
    svg
}

/// Output pixel size for a view at the given scale.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn output_size(view: &CardView, scale: f32) -> (u32, u32) {
    let w = (view.geometry.width * scale).round().max(1.0) as u32;
    let h = (view.geometry.height * scale).round().max(1.0) as u32;
    (w, h)
}

fn render_text_block(svg: &mut String, block: &TextBlock, view_w: f32, view_h: f32) {
    let color = escape_xml(block.color.as_str());

    if let Some(fill) = &block.fill {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{r}\" ry=\"{r}\" fill=\"{}\"/>",
            block.x,
            block.y,
            block.width,
            block.height,
            escape_xml(fill.as_str()),
            r = block.corner_radius,
        );
    }

    if let Some(border) = block.effect.border_px {
        let inset = border / 2.0;
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{border}\"/>",
            block.x + inset,
            block.y + inset,
            block.width - border,
            block.height - border,
            block.corner_radius,
        );
    }

    let has_shadows = !block.effect.shadows.is_empty();
    if has_shadows {
        write_shadow_filter(svg, block, view_w, view_h);
    }

    let anchor = match block.align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    };
    let weight = if block.bold { "bold" } else { "normal" };

    let _ = write!(
        svg,
        "<text xml:space=\"preserve\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{weight}\" fill=\"{color}\" text-anchor=\"{anchor}\"",
        block.font_family.generic_name(),
        block.font_size,
    );
    if block.letter_spacing.abs() > f32::EPSILON {
        let _ = write!(svg, " letter-spacing=\"{}\"", block.letter_spacing);
    }
    if has_shadows {
        let _ = write!(svg, " filter=\"url(#{EFFECT_FILTER_ID})\"");
    }
    svg.push('>');

    for line in &block.lines {
        let _ = write!(
            svg,
            "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
            line.x,
            line.baseline,
            escape_xml(&line.text),
        );
    }

    svg.push_str("</text>");
}

/// Emit a filter that paints every shadow under the source graphic.
///
/// CSS paints the first shadow on top, so the merge order is reversed.
fn write_shadow_filter(svg: &mut String, block: &TextBlock, view_w: f32, view_h: f32) {
    let _ = write!(
        svg,
        "<defs><filter id=\"{EFFECT_FILTER_ID}\" filterUnits=\"userSpaceOnUse\" x=\"0\" y=\"0\" width=\"{view_w}\" height=\"{view_h}\">",
    );

    for (i, shadow) in block.effect.shadows.iter().enumerate() {
        let _ = write!(
            svg,
            "<feOffset in=\"SourceAlpha\" dx=\"{}\" dy=\"{}\" result=\"offset{i}\"/>",
            shadow.dx, shadow.dy,
        );
        let _ = write!(
            svg,
            "<feGaussianBlur in=\"offset{i}\" stdDeviation=\"{}\" result=\"blur{i}\"/>",
            shadow.blur / 2.0,
        );
        let _ = write!(
            svg,
            "<feFlood flood-color=\"{}\" result=\"color{i}\"/>",
            escape_xml(shadow.color),
        );
        let _ = write!(
            svg,
            "<feComposite in=\"color{i}\" in2=\"blur{i}\" operator=\"in\" result=\"shadow{i}\"/>",
        );
    }

    svg.push_str("<feMerge>");
    for i in (0..block.effect.shadows.len()).rev() {
        let _ = write!(svg, "<feMergeNode in=\"shadow{i}\"/>");
    }
    svg.push_str("<feMergeNode in=\"SourceGraphic\"/></feMerge></filter></defs>");
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::{
        BackgroundImage, CardGeometry, Color, Position, PresentationState, StylePreset,
    };

    fn view_of(state: &PresentationState) -> CardView {
        CardView::project(state, CardGeometry::default())
    }

    #[test]
    fn test_empty_card_is_solid_background() {
        let svg = render_svg(&view_of(&PresentationState::new()), 1.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("fill=\"#f3f4f6\""));
        assert!(!svg.contains("<text"));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn test_scale_changes_pixels_not_view_box() {
        let svg = render_svg(&view_of(&PresentationState::new()), 2.0);
        assert!(svg.contains("width=\"1600\""));
        assert!(svg.contains("viewBox=\"0 0 800 800\""));
    }

    #[test]
    fn test_text_lines_become_tspans() {
        let mut state = PresentationState::new();
        state.set_text("Hello\nWorld");
        state.set_position(Position::BottomRight);
        let svg = render_svg(&view_of(&state), 1.0);
        assert_eq!(svg.matches("<tspan").count(), 2);
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains(">Hello</tspan>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut state = PresentationState::new();
        state.set_text("A < B & \"C\"");
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(svg.contains("A &lt; B &amp; &quot;C&quot;"));
    }

    #[test]
    fn test_shadow_filter_for_presets() {
        let mut state = PresentationState::new();
        state.set_text("glow");
        state.set_style_preset(StylePreset::Neon);
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(svg.contains("filter=\"url(#text-effect)\""));
        assert_eq!(svg.matches("<feFlood").count(), 6);
        assert!(svg.contains("flood-color=\"#0fa\""));

        state.set_style_preset(StylePreset::Normal);
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(!svg.contains("<filter"));
    }

    #[test]
    fn test_minimal_preset_draws_border_in_text_color() {
        let mut state = PresentationState::new();
        state.set_text("mono");
        state.set_text_color(Color::new("#336699"));
        state.set_style_preset(StylePreset::Minimal);
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(svg.contains("stroke=\"#336699\""));
        assert!(svg.contains("font-family=\"monospace\""));
        assert!(svg.contains("letter-spacing="));
    }

    #[test]
    fn test_text_background_rect() {
        let mut state = PresentationState::new();
        state.set_text("boxed");
        state.set_text_background_color(Color::new("#ffffff"));
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(svg.contains("rx=\"4\""));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn test_background_image_is_embedded() {
        let mut state = PresentationState::new();
        state.set_background_image(BackgroundImage::new("image/png", vec![1, 2, 3]));
        let svg = render_svg(&view_of(&state), 1.0);
        assert!(svg.contains("<image"));
        assert!(svg.contains("href=\"data:image/png;base64,AQID\""));
        assert!(svg.contains("xMidYMid slice"));
        assert!(!svg.contains("#f3f4f6"));
    }
}
