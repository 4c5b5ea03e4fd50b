//! Vertical rhythm and type scale
//!
//! The typography settings are computed once from a static theme
//! description and never change afterwards.

use lazy_static::lazy_static;

/// Static description of a typography theme
#[derive(Debug, Clone, Copy)]
pub struct TypographyTheme {
    pub base_font_size_px: f64,
    pub base_line_height: f64,
    pub scale_ratio: f64,
    pub header_font_family: &'static [&'static str],
    pub body_font_family: &'static [&'static str],
    pub header_weight: u16,
    pub body_weight: u16,
    pub bold_weight: u16,
    pub header_color: &'static str,
    pub body_color: &'static str,
}

/// Lato headers over a Cabin body
pub const NORIEGA: TypographyTheme = TypographyTheme {
    base_font_size_px: 18.0,
    base_line_height: 1.56,
    scale_ratio: 2.0,
    header_font_family: &["Lato", "sans-serif"],
    body_font_family: &["Cabin", "serif"],
    header_weight: 700,
    body_weight: 400,
    bold_weight: 700,
    header_color: "hsla(0,0%,0%,1)",
    body_color: "hsla(0,0%,0%,0.8)",
};

lazy_static! {
    /// Process-wide typography, read-only after first use
    pub static ref TYPOGRAPHY: Typography = Typography::new(NORIEGA);
}

/// Vertical rhythm of `lines` base line heights, in rem
pub fn rhythm(lines: f64) -> String {
    TYPOGRAPHY.rhythm(lines)
}

/// Computed typography settings
#[derive(Debug, Clone)]
pub struct Typography {
    theme: TypographyTheme,
    css: String,
}

impl Typography {
    pub fn new(theme: TypographyTheme) -> Self {
        let mut typography = Self {
            theme,
            css: String::new(),
        };
        typography.css = typography.build_css();
        typography
    }

    pub fn theme(&self) -> &TypographyTheme {
        &self.theme
    }

    /// `lines * base_line_height` rem
    pub fn rhythm(&self, lines: f64) -> String {
        format!("{}rem", round(lines * self.theme.base_line_height))
    }

    /// Modular scale step, `scale_ratio ^ value` rem
    pub fn scale(&self, value: f64) -> String {
        format!("{}rem", round(self.theme.scale_ratio.powf(value)))
    }

    /// Base stylesheet for the theme
    pub fn css(&self) -> &str {
        &self.css
    }

    fn build_css(&self) -> String {
        let t = &self.theme;
        let font_size_pct = round(t.base_font_size_px / 16.0 * 100.0);
        let body_fonts = font_stack(t.body_font_family);
        let header_fonts = font_stack(t.header_font_family);
        let gap = self.rhythm(1.0);

        let mut css = String::new();
        css.push_str(&format!(
            "html{{font:{}%/{} {};box-sizing:border-box;overflow-y:scroll;}}",
            font_size_pct, t.base_line_height, body_fonts
        ));
        css.push_str("*,*:before,*:after{box-sizing:inherit;}");
        css.push_str(&format!(
            "body{{color:{};font-family:{};font-weight:{};word-wrap:break-word;}}",
            t.body_color, body_fonts, t.body_weight
        ));
        css.push_str(&format!("b,strong{{font-weight:{};}}", t.bold_weight));
        css.push_str(&format!(
            "h1,h2,h3,h4,h5,h6,p,ul,ol,pre,table,blockquote,figure,img{{margin:0 0 {} 0;padding:0;}}",
            gap
        ));
        css.push_str(&format!(
            "h1,h2,h3,h4,h5,h6{{color:{};font-family:{};font-weight:{};text-rendering:optimizeLegibility;line-height:1.1;}}",
            t.header_color, header_fonts, t.header_weight
        ));

        let steps = [
            ("h1", 5.0),
            ("h2", 3.0),
            ("h3", 2.0),
            ("h4", 0.0),
            ("h5", -1.0),
            ("h6", -1.5),
        ];
        for (tag, step) in steps {
            css.push_str(&format!("{}{{font-size:{};}}", tag, self.scale(step / 5.0)));
        }

        css.push_str(&format!(
            "ul,ol{{margin-left:{};}}li{{margin-bottom:calc({} / 2);}}",
            gap, gap
        ));
        css.push_str("img{max-width:100%;}");
        css
    }
}

fn font_stack(families: &[&str]) -> String {
    families
        .iter()
        .map(|f| {
            if f.contains(' ') {
                format!("'{}'", f)
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn round(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
