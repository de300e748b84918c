use serde::{Deserialize, Serialize};

/// The fixed key set of `sections`. Nothing else is ever required to exist there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Summary,
    Awards,
    Certifications,
    Education,
    Experience,
    Volunteer,
    Interests,
    Languages,
    Profiles,
    Projects,
    Publications,
    References,
    Skills,
    Custom,
}

impl SectionKey {
    pub const ALL: [SectionKey; 14] = [
        SectionKey::Summary,
        SectionKey::Awards,
        SectionKey::Certifications,
        SectionKey::Education,
        SectionKey::Experience,
        SectionKey::Volunteer,
        SectionKey::Interests,
        SectionKey::Languages,
        SectionKey::Profiles,
        SectionKey::Projects,
        SectionKey::Publications,
        SectionKey::References,
        SectionKey::Skills,
        SectionKey::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Summary => "summary",
            SectionKey::Awards => "awards",
            SectionKey::Certifications => "certifications",
            SectionKey::Education => "education",
            SectionKey::Experience => "experience",
            SectionKey::Volunteer => "volunteer",
            SectionKey::Interests => "interests",
            SectionKey::Languages => "languages",
            SectionKey::Profiles => "profiles",
            SectionKey::Projects => "projects",
            SectionKey::Publications => "publications",
            SectionKey::References => "references",
            SectionKey::Skills => "skills",
            SectionKey::Custom => "custom",
        }
    }

    /// Heading shown by the renderer; also used for placeholder item names.
    pub fn display_name(self) -> &'static str {
        match self {
            SectionKey::Summary => "Summary",
            SectionKey::Awards => "Awards",
            SectionKey::Certifications => "Certifications",
            SectionKey::Education => "Education",
            SectionKey::Experience => "Experience",
            SectionKey::Volunteer => "Volunteering",
            SectionKey::Interests => "Interests",
            SectionKey::Languages => "Languages",
            SectionKey::Profiles => "Profiles",
            SectionKey::Projects => "Projects",
            SectionKey::Publications => "Publications",
            SectionKey::References => "References",
            SectionKey::Skills => "Skills",
            SectionKey::Custom => "Custom",
        }
    }

    /// Whether the section is shown when it has content.
    pub fn default_visible(self) -> bool {
        matches!(
            self,
            SectionKey::Summary
                | SectionKey::Education
                | SectionKey::Experience
                | SectionKey::Profiles
                | SectionKey::Projects
                | SectionKey::Skills
        )
    }

    /// Sections whose value is `{..header, items: [...]}`.
    pub fn has_items(self) -> bool {
        !matches!(self, SectionKey::Summary | SectionKey::Custom)
    }

    /// Sections whose items carry an external `url: {label, href}`.
    pub fn has_links(self) -> bool {
        matches!(
            self,
            SectionKey::Awards
                | SectionKey::Certifications
                | SectionKey::Education
                | SectionKey::Experience
                | SectionKey::Volunteer
                | SectionKey::Profiles
                | SectionKey::Projects
                | SectionKey::Publications
                | SectionKey::References
        )
    }

    pub fn item_sections() -> impl Iterator<Item = SectionKey> {
        Self::ALL.into_iter().filter(|key| key.has_items())
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
