use crate::core::{
    config::Texts,
    constants::COORDINATE_PRECISION,
    geo::{LatLng, Point},
};

/// Static labels of the popup template
#[derive(Debug, Clone, PartialEq)]
pub struct PopupTemplate {
    pub title: String,
    pub address_label: String,
    pub coordinates_label: String,
}

impl PopupTemplate {
    pub fn from_texts(texts: &Texts) -> Self {
        Self {
            title: texts.popup_title.clone(),
            address_label: texts.popup_address_label.clone(),
            coordinates_label: texts.popup_coordinates_label.clone(),
        }
    }
}

impl Default for PopupTemplate {
    fn default() -> Self {
        Self::from_texts(&Texts::default())
    }
}

/// What the popup currently says
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub address: String,
    pub coordinate: LatLng,
}

impl PopupContent {
    /// Coordinate as `"lng, lat"` with six decimals
    pub fn coordinates_text(&self) -> String {
        self.coordinate.format_lon_lat(COORDINATE_PRECISION)
    }
}

type DismissCallback = Box<dyn FnMut() + Send>;

/// An overlay anchored to a projected coordinate, showing a place description.
///
/// The popup is visible exactly when it has an anchor.
pub struct PopupOverlay {
    id: String,
    template: PopupTemplate,
    anchor: Option<Point>,
    content: Option<PopupContent>,
    auto_pan: bool,
    on_dismiss: Option<DismissCallback>,
}

impl PopupOverlay {
    pub fn new(id: String, template: PopupTemplate) -> Self {
        Self {
            id,
            template,
            anchor: None,
            content: None,
            auto_pan: false,
            on_dismiss: None,
        }
    }

    pub fn with_auto_pan(mut self, auto_pan: bool) -> Self {
        self.auto_pan = auto_pan;
        self
    }

    /// Called after the dismiss control hid the popup
    pub fn with_on_dismiss(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_dismiss = Some(Box::new(callback));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &PopupTemplate {
        &self.template
    }

    pub fn auto_pan(&self) -> bool {
        self.auto_pan
    }

    /// Fills the template with `address` and the anchor's coordinate, then
    /// positions the popup at `anchor`.
    pub fn show(&mut self, anchor: Point, address: impl Into<String>) {
        self.content = Some(PopupContent {
            address: address.into(),
            coordinate: LatLng::from_mercator(anchor),
        });
        self.anchor = Some(anchor);
    }

    /// Clears the position; the content stays for the next `show`
    pub fn hide(&mut self) {
        self.anchor = None;
    }

    /// The dismiss control: hides, then notifies the callback
    pub fn dismiss(&mut self) {
        self.hide();
        if let Some(callback) = self.on_dismiss.as_mut() {
            callback();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    /// Plain-text rendering, one line per template row
    pub fn text(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        Some(format!(
            "{}\n{}: {}\n{}: {}",
            self.template.title,
            self.template.address_label,
            content.address,
            self.template.coordinates_label,
            content.coordinates_text()
        ))
    }

    /// HTML rendering for DOM hosts. The address comes from a remote service
    /// and is escaped.
    pub fn to_html(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        Some(format!(
            concat!(
                "<button class=\"close-btn\">&times;</button>\n",
                "<h3>{}</h3>\n",
                "<p><strong>{}:</strong> {}</p>\n",
                "<p><strong>{}:</strong> {}</p>\n"
            ),
            escape_html(&self.template.title),
            escape_html(&self.template.address_label),
            escape_html(&content.address),
            escape_html(&self.template.coordinates_label),
            content.coordinates_text()
        ))
    }
}

impl std::fmt::Debug for PopupOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupOverlay")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("content", &self.content)
            .field("auto_pan", &self.auto_pan)
            .finish_non_exhaustive()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
