use serde::{Deserialize, Serialize};

/// Read-only view of a rendered page, as captured by the host.
///
/// `text` is the page's visible text; `None` means it could not be
/// captured, in which case content checks are skipped rather than scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub title: Option<String>,
    pub text: Option<String>,
    pub forms: Vec<FormElement>,
    pub scripts: Vec<ScriptElement>,
    pub images: Vec<ImageElement>,
    pub iframes: Vec<IframeElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormElement {
    pub action: String,
    pub method: String,
    pub inputs: Vec<InputField>,
}

impl FormElement {
    pub fn has_password_field(&self) -> bool {
        self.inputs
            .iter()
            .any(|input| input.input_type.eq_ignore_ascii_case("password"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputField {
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptElement {
    pub src: Option<String>,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageElement {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IframeElement {
    pub src: String,
    pub style: String,
}

impl IframeElement {
    /// Inline style hides the frame (`display:none` or `visibility:hidden`)
    pub fn is_hidden(&self) -> bool {
        let style: String = self
            .style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "text": "Please verify immediately",
            "forms": [{
                "action": "/login",
                "method": "post",
                "inputs": [{"type": "password", "name": "pw"}]
            }],
            "iframes": [{"src": "https://x.example/f", "style": "display: none"}]
        }"#;
        let page: PageSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(page.text.as_deref(), Some("Please verify immediately"));
        assert!(page.forms[0].has_password_field());
        assert_eq!(page.forms[0].inputs[0].placeholder, "");
        assert!(page.iframes[0].is_hidden());
        assert!(page.scripts.is_empty());
    }

    #[test]
    fn test_iframe_visibility() {
        let visible = IframeElement {
            src: "https://a.example".to_string(),
            style: "width: 10px".to_string(),
        };
        let hidden = IframeElement {
            src: "https://a.example".to_string(),
            style: "Visibility: Hidden".to_string(),
        };
        assert!(!visible.is_hidden());
        assert!(hidden.is_hidden());
    }
}
