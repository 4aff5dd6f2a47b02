pub type Rgb = (u8, u8, u8);

/// Player color palette, assigned round-robin in feed discovery order.
pub const PLAYER_PALETTE: [Rgb; 3] = [(0xb9, 0x42, 0xf5), (0x5a, 0xf5, 0x42), (0xf5, 0xd7, 0x42)];

pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);

/// Color for the `index`-th online player of a poll cycle.
pub fn palette_color(index: usize) -> Rgb {
    PLAYER_PALETTE[index % PLAYER_PALETTE.len()]
}

/// Format RGB as a `#rrggbb` CSS color string.
pub fn hex_css((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Format RGBA as a CSS color string.
pub fn rgba_css((r, g, b): Rgb, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

#[cfg(test)]
mod tests {
    use super::{PLAYER_PALETTE, hex_css, palette_color, rgba_css};

    #[test]
    fn palette_cycles_every_three_players() {
        assert_eq!(palette_color(0), PLAYER_PALETTE[0]);
        assert_eq!(palette_color(1), PLAYER_PALETTE[1]);
        assert_eq!(palette_color(2), PLAYER_PALETTE[2]);
        assert_eq!(palette_color(3), palette_color(0));
        assert_eq!(palette_color(7), palette_color(1));
    }

    #[test]
    fn palette_matches_its_hex_spelling() {
        let spelled: Vec<String> = PLAYER_PALETTE.iter().copied().map(hex_css).collect();
        assert_eq!(spelled, ["#b942f5", "#5af542", "#f5d742"]);
    }

    #[test]
    fn rgba_css_formats_alpha() {
        assert_eq!(rgba_css((1, 2, 3), 0.25), "rgba(1,2,3,0.25)");
    }
}
