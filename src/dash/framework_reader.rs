use std::fs;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use indicator_normalizer::{ClassifierConfig, IndicatorMeta, MetaTable, NameCleaner};

use crate::dash::{BDashResult, OpeningJsonSnafu, ParsingJsonSnafu};

/// One indicator entry of a framework file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkIndicator {
    pub id: String,
    /// Sheet name carrying this indicator, for workbooks whose sheets are
    /// numbered instead of labeled.
    #[serde(default)]
    pub sheet: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "unknown")]
    pub unit: String,
    #[serde(default = "unknown")]
    pub category: String,
    #[serde(default = "unknown")]
    pub subcategory: String,
    #[serde(default = "unknown")]
    pub layer: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AcronymFix {
    pub find: String,
    pub replace: String,
}

/// The indicator framework: dataset metadata, the indicator table, and
/// optional overrides of the classifier configuration. Loaded once per run
/// and passed down; nothing here is global state.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub title: String,
    pub description: String,
    pub indicators: Vec<FrameworkIndicator>,
    #[serde(default)]
    pub country_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub year_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub indicator_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub metadata_columns: Option<Vec<String>>,
    #[serde(default)]
    pub acronyms: Option<Vec<AcronymFix>>,
}

impl Framework {
    pub fn classifier_config(&self) -> ClassifierConfig {
        let mut config = ClassifierConfig::default();
        if let Some(kw) = &self.country_keywords {
            config.country_keywords = kw.clone();
        }
        if let Some(kw) = &self.year_keywords {
            config.year_keywords = kw.clone();
        }
        if let Some(kw) = &self.indicator_keywords {
            config.indicator_keywords = kw.clone();
        }
        if let Some(cols) = &self.metadata_columns {
            config.metadata_columns = cols.iter().map(|c| c.to_lowercase()).collect();
        }
        config
    }

    pub fn name_cleaner(&self) -> NameCleaner {
        match &self.acronyms {
            None => NameCleaner::default(),
            Some(fixes) => NameCleaner {
                replacements: fixes
                    .iter()
                    .map(|f| (f.find.clone(), f.replace.clone()))
                    .collect(),
            },
        }
    }

    /// The metadata table, in the file's declaration order.
    pub fn meta_table(&self) -> MetaTable {
        MetaTable::new(
            self.indicators
                .iter()
                .map(|i| IndicatorMeta {
                    id: i.id.clone(),
                    sheet_key: i.sheet.clone(),
                    name: i.name.clone(),
                    description: i.description.clone(),
                    unit: i.unit.clone(),
                    category: i.category.clone(),
                    subcategory: i.subcategory.clone(),
                    layer: i.layer.clone(),
                })
                .collect(),
        )
    }
}

pub fn read_framework(path: String) -> BDashResult<Framework> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let framework: Framework =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(framework)
}

fn entry(
    sheet: &str,
    id: &str,
    name: &str,
    description: &str,
    unit: &str,
    category: &str,
    subcategory: &str,
    layer: &str,
) -> FrameworkIndicator {
    FrameworkIndicator {
        id: id.to_string(),
        sheet: Some(sheet.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        unit: unit.to_string(),
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        layer: layer.to_string(),
    }
}

/// The built-in 17-indicator framework covering Foundational and Digital
/// Capabilities, keyed to the numbered sheets of the source workbook.
pub fn builtin_framework() -> Framework {
    const FOUNDATIONAL: &str = "Foundational Capabilities";
    const DIGITAL: &str = "Digital Capabilities";
    let indicators = vec![
        entry(
            "1",
            "energy_availability",
            "Energy availability",
            "Electricity consumption per capita",
            "kWh per capita",
            FOUNDATIONAL,
            "Enabling Infrastructure - Energy",
            "Basic",
        ),
        entry(
            "2",
            "energy_reliability",
            "Energy reliability",
            "Percentage of firms experiencing electrical outages",
            "%",
            FOUNDATIONAL,
            "Enabling Infrastructure - Energy",
            "Basic",
        ),
        entry(
            "3",
            "digital_connectivity",
            "Access to digital connectivity",
            "Fixed broadband subscriptions per 100 people",
            "per 100 people",
            FOUNDATIONAL,
            "Enabling Infrastructure - Digital",
            "Basic",
        ),
        entry(
            "4",
            "connectivity_quality",
            "Quality of connectivity",
            "Mean download speed (Mbps)",
            "Mbps",
            FOUNDATIONAL,
            "Enabling Infrastructure - Digital",
            "Basic",
        ),
        entry(
            "5",
            "productive_investments",
            "Productive investments",
            "Gross Fixed Capital Formation (GFCF, % of GDP)",
            "% of GDP",
            FOUNDATIONAL,
            "Production Capabilities - Basic",
            "Basic",
        ),
        entry(
            "6",
            "productive_skills",
            "Productive skills",
            "Mean years of schooling",
            "years",
            FOUNDATIONAL,
            "Production Capabilities - Basic",
            "Basic",
        ),
        entry(
            "7",
            "operational_efficiency",
            "Operational efficiency",
            "ISO 9001 certificates",
            "certificates",
            FOUNDATIONAL,
            "Production Capabilities - Intermediate",
            "Intermediate",
        ),
        entry(
            "8",
            "technology_absorption",
            "Technology absorption",
            "Intellectual Property Right payments (royalties, % of GDP)",
            "% of GDP",
            FOUNDATIONAL,
            "Production Capabilities - Intermediate",
            "Intermediate",
        ),
        entry(
            "9",
            "advanced_skills",
            "Advanced skills",
            "Gross enrolment ratio in tertiary education",
            "%",
            FOUNDATIONAL,
            "Innovation Capabilities - Basic (Effort)",
            "Basic",
        ),
        entry(
            "10",
            "specialized_skills",
            "Specialized skills",
            "Percentage of graduates from STEM programmes in tertiary education",
            "%",
            FOUNDATIONAL,
            "Innovation Capabilities - Basic (Effort)",
            "Basic",
        ),
        entry(
            "11",
            "research_effort",
            "Research effort",
            "Gross Expenditure in R&D (% of GDP)",
            "% of GDP",
            FOUNDATIONAL,
            "Innovation Capabilities - Basic (Effort)",
            "Basic",
        ),
        entry(
            "12",
            "research_output",
            "Research output",
            "Scientific and technical journal articles per million people",
            "per million people",
            FOUNDATIONAL,
            "Innovation Capabilities - Intermediate (Output)",
            "Intermediate",
        ),
        entry(
            "13",
            "innovation_patents",
            "Innovation output (patents)",
            "Total patents in force per 100 billion USD GDP",
            "per 100 billion USD GDP",
            FOUNDATIONAL,
            "Innovation Capabilities - Intermediate (Output)",
            "Intermediate",
        ),
        entry(
            "14",
            "innovation_royalties",
            "Innovation output (royalties)",
            "Intellectual Property Right receipts (royalties, % of GDP)",
            "% of GDP",
            FOUNDATIONAL,
            "Innovation Capabilities - Intermediate (Output)",
            "Intermediate",
        ),
        entry(
            "15",
            "digital_absorption",
            "Absorption and exposure to production technologies with digital potential",
            "Imports of production technologies (% of GDP)",
            "% of GDP",
            DIGITAL,
            "Absorption & Exposure",
            "Advanced",
        ),
        entry(
            "16",
            "digital_deployment",
            "Deployment and adaptation of digital production technologies",
            "Imports of digital products (% of GDP)",
            "% of GDP",
            DIGITAL,
            "Deployment & Adaptation",
            "Advanced",
        ),
        entry(
            "17",
            "digital_competitiveness",
            "Industrial competitiveness in digital technologies",
            "Exports of digital products (% of GDP)",
            "% of GDP",
            DIGITAL,
            "Deployment & Adaptation",
            "Advanced",
        ),
    ];
    Framework {
        title: "Western Balkans Dashboard Data".to_string(),
        description: "Comprehensive dataset covering 17 indicators across Foundational and Digital Capabilities"
            .to_string(),
        indicators,
        country_keywords: None,
        year_keywords: None,
        indicator_keywords: None,
        metadata_columns: None,
        acronyms: None,
    }
}
