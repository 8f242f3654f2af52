use serde::{Deserialize, Serialize};

const APP_ACCENTS: [&str; 8] = [
    "#4C6FBF", "#3E9C6E", "#B0683C", "#8A5BB5", "#3C8FA8", "#B54A6B", "#7A863B", "#5A6B7F",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_border: String,
    pub header_text: String,
    pub field_text: String,
    pub type_text: String,
    pub pk_text: String,
    pub line_color: String,
    /// Header accents cycled per app namespace.
    pub app_accents: Vec<String>,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            header_text: "#1C2430".to_string(),
            field_text: "#2A3342".to_string(),
            type_text: "#7A8AA6".to_string(),
            pk_text: "#8A5BB5".to_string(),
            line_color: "#7A8AA6".to_string(),
            app_accents: APP_ACCENTS.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            node_fill: "#ECECFF".to_string(),
            node_border: "#9370DB".to_string(),
            header_text: "#333333".to_string(),
            field_text: "#333333".to_string(),
            type_text: "#666666".to_string(),
            pk_text: "#9370DB".to_string(),
            line_color: "#333333".to_string(),
            app_accents: APP_ACCENTS.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn app_accent(&self, index: usize) -> &str {
        if self.app_accents.is_empty() {
            return &self.node_border;
        }
        &self.app_accents[index % self.app_accents.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}
