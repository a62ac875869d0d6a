use u8g2_fonts::{Font, FontRenderer, fonts};

/// Fonts for every text role on screen.
pub struct FontSet {
    pub time: FontRenderer,
    pub seconds: FontRenderer,
    pub date: FontRenderer,
    pub temperature: FontRenderer,
    pub degree: FontRenderer,
    pub conditions: FontRenderer,
    pub umbrella: FontRenderer,
    pub row_label: FontRenderer,
    pub row_temperature: FontRenderer,
    pub row_degree: FontRenderer,
    pub precip: FontRenderer,
    pub info: FontRenderer,
    pub event: FontRenderer,
}

// Text fonts carry Latin-1 so Spanish labels and the degree sign render.
fn font<F: Font>() -> FontRenderer {
    FontRenderer::new::<F>().with_ignore_unknown_chars(true)
}

impl FontSet {
    /// 320-line class displays.
    pub fn compact() -> Self {
        Self {
            time: font::<fonts::u8g2_font_logisoso62_tn>(),
            seconds: font::<fonts::u8g2_font_logisoso30_tn>(),
            date: font::<fonts::u8g2_font_helvR18_tf>(),
            temperature: font::<fonts::u8g2_font_logisoso50_tn>(),
            degree: font::<fonts::u8g2_font_helvR24_tf>(),
            conditions: font::<fonts::u8g2_font_helvR10_tf>(),
            umbrella: font::<fonts::u8g2_font_helvB10_tf>(),
            row_label: font::<fonts::u8g2_font_helvR14_tf>(),
            row_temperature: font::<fonts::u8g2_font_helvR18_tf>(),
            row_degree: font::<fonts::u8g2_font_helvR10_tf>(),
            precip: font::<fonts::u8g2_font_helvR14_tf>(),
            info: font::<fonts::u8g2_font_helvR18_tf>(),
            event: font::<fonts::u8g2_font_helvR14_tf>(),
        }
    }

    /// HD-class displays.
    pub fn large() -> Self {
        Self {
            time: font::<fonts::u8g2_font_logisoso92_tn>(),
            seconds: font::<fonts::u8g2_font_logisoso46_tn>(),
            date: font::<fonts::u8g2_font_helvR24_tf>(),
            temperature: font::<fonts::u8g2_font_logisoso78_tn>(),
            degree: font::<fonts::u8g2_font_helvB24_tf>(),
            conditions: font::<fonts::u8g2_font_helvR18_tf>(),
            umbrella: font::<fonts::u8g2_font_helvB18_tf>(),
            row_label: font::<fonts::u8g2_font_helvR24_tf>(),
            row_temperature: font::<fonts::u8g2_font_helvB24_tf>(),
            row_degree: font::<fonts::u8g2_font_helvR14_tf>(),
            precip: font::<fonts::u8g2_font_helvR24_tf>(),
            info: font::<fonts::u8g2_font_helvR24_tf>(),
            event: font::<fonts::u8g2_font_helvR24_tf>(),
        }
    }
}
