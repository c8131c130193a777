use std::fmt;

/// Vy som väljs av fragmentet (`#/tasks`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Dashboard,
    Tagup,
    Tasks,
    Rfis,
    Risks,
    Tfr,
    Settings,
}

impl Route {
    /// Tolka `#/tasks`, `/tasks/123` eller `tasks`. Okänt blir Dashboard.
    pub fn from_hash(hash: &str) -> Self {
        let segment = hash
            .trim()
            .trim_start_matches('#')
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match segment.as_str() {
            "tagup" | "standup" | "stand-up" | "tag-up" => Self::Tagup,
            "tasks" => Self::Tasks,
            "rfis" => Self::Rfis,
            "risks" => Self::Risks,
            "tfr" => Self::Tfr,
            "settings" => Self::Settings,
            _ => Self::Dashboard,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Tagup => "tagup",
            Self::Tasks => "tasks",
            Self::Rfis => "rfis",
            Self::Risks => "risks",
            Self::Tfr => "tfr",
            Self::Settings => "settings",
        }
    }

    pub fn hash(&self) -> String {
        format!("#/{}", self.slug())
    }

    /// Rubrik i navigeringen
    pub fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Tagup => "Daily Tag-Up",
            Self::Tasks => "Tasks",
            Self::Rfis => "RFIs",
            Self::Risks => "Risks",
            Self::Tfr => "TFR Tracker",
            Self::Settings => "Settings",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Dashboard,
            Self::Tagup,
            Self::Tasks,
            Self::Rfis,
            Self::Risks,
            Self::Tfr,
            Self::Settings,
        ]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
