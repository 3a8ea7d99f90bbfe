//! Care advice catalog
//!
//! Static guidance per predicted disease. Lookups ignore case and surrounding
//! whitespace; unknown names get the generic entry.

use serde::Serialize;

/// Foods to prefer and to limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nutrition {
    pub recommended: &'static [&'static str],
    pub avoid: &'static [&'static str],
}

/// Guidance for one condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    /// Catalog key, `"default"` for the generic entry
    pub condition: &'static str,
    pub short: &'static str,
    pub avoid: &'static [&'static str],
    #[serde(rename = "do")]
    pub do_: &'static [&'static str],
    pub prevention: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    /// Whether the condition warrants prompt medical attention
    pub urgent: bool,
    pub notes: &'static str,
}

pub const DEFAULT_CONDITION: &str = "default";

static DEFAULT: Advice = Advice {
    condition: DEFAULT_CONDITION,
    short: "No specific guidance available for this condition.",
    avoid: &[],
    do_: &["Consult a healthcare provider for personalized advice."],
    prevention: &[],
    nutrition: None,
    urgent: false,
    notes: "",
};

static CATALOG: &[Advice] = &[
    Advice {
        condition: "Flu",
        short: "Likely viral flu: rest, fluids, and monitor symptoms closely.",
        avoid: &[
            "Avoid crowded places to prevent spreading infection",
            "Avoid heavy physical exertion until recovery",
            "Avoid alcohol and smoking as they slow recovery",
            "Avoid cold or refrigerated food/drinks during fever",
        ],
        do_: &[
            "Stay hydrated with warm water, soups, and herbal tea",
            "Take paracetamol/acetaminophen for fever or pain (as advised)",
            "Get plenty of rest and sleep",
            "Eat light, nutritious meals (soups, fruits, and cooked vegetables)",
            "Use a humidifier or inhale steam to relieve congestion",
            "Cover mouth and nose when sneezing or coughing",
            "Wash hands frequently with soap or sanitizer",
        ],
        prevention: &[
            "Get a yearly flu vaccination if available",
            "Maintain good personal hygiene",
            "Avoid close contact with sick individuals",
            "Keep your immune system strong with a healthy diet and enough sleep",
        ],
        nutrition: Some(Nutrition {
            recommended: &[
                "Citrus fruits (Vitamin C)",
                "Garlic",
                "Ginger",
                "Honey",
                "Warm soups",
                "Turmeric milk",
            ],
            avoid: &["Cold drinks", "Fried and processed foods", "Sugar-rich foods"],
        }),
        urgent: false,
        notes: "Seek urgent medical care if you experience difficulty breathing, chest pain, persistent vomiting, \
                confusion, dehydration, or a high fever (>39°C) lasting more than 3 days. Elderly, pregnant women, \
                or those with chronic conditions should consult a doctor early.",
    },
    Advice {
        condition: "Heart Disease",
        short: "Possible cardiac risk: seek medical advice and maintain heart-healthy habits.",
        avoid: &[
            "Avoid strenuous exercise until cleared by a doctor",
            "Avoid high-salt and high-fat foods (processed meats, fried foods, junk food)",
            "Avoid smoking and alcohol",
            "Avoid stress, anxiety, and lack of sleep",
            "Avoid skipping prescribed medications",
        ],
        do_: &[
            "Consult a cardiologist for evaluation and tests (ECG, Echo, etc.)",
            "Take prescribed medications regularly and on time",
            "Maintain a balanced diet rich in fruits, vegetables, whole grains, and lean protein",
            "Engage in light physical activity (like walking) if approved by your doctor",
            "Monitor blood pressure, cholesterol, and blood sugar regularly",
            "Get adequate rest and hydration",
            "Practice yoga or meditation for stress relief",
        ],
        prevention: &[
            "Maintain a healthy weight and BMI",
            "Control diabetes, cholesterol, and hypertension",
            "Exercise regularly (after doctor approval)",
            "Limit salt and sugar intake",
            "Quit smoking",
            "Have regular heart check-ups, especially with family history",
        ],
        nutrition: Some(Nutrition {
            recommended: &[
                "Oats and whole grains",
                "Leafy greens (spinach, kale)",
                "Berries and citrus fruits",
                "Fish rich in omega-3 (salmon, tuna)",
                "Nuts (almonds, walnuts)",
                "Olive oil instead of butter",
            ],
            avoid: &[
                "Fried foods and processed snacks",
                "Red meats and full-fat dairy",
                "Salted chips and pickles",
                "Sugary drinks and sweets",
            ],
        }),
        urgent: true,
        notes: "Seek emergency care if you experience severe chest pain, pain radiating to the arm/jaw, sweating, \
                fainting, or shortness of breath.",
    },
    Advice {
        condition: "Kidney Disease",
        short: "Possible kidney function issue: maintain hydration and avoid kidney stress.",
        avoid: &[
            "High-salt and high-protein diets (red meat, processed food)",
            "Painkillers like ibuprofen or diclofenac without advice",
            "Dehydration or skipping fluids",
            "Unregulated supplements or herbal medicines",
            "Smoking and alcohol",
        ],
        do_: &[
            "Drink adequate water (as advised by your doctor)",
            "Limit salt and potassium if prescribed",
            "Monitor blood pressure and blood sugar regularly",
            "Eat a kidney-friendly diet (low sodium, moderate protein)",
            "Consult a nephrologist for diagnosis and tests",
            "Track urine output and swelling signs daily",
        ],
        prevention: &[
            "Control diabetes and blood pressure",
            "Avoid overuse of painkillers",
            "Regular kidney checkups (creatinine, GFR)",
            "Maintain healthy weight and regular exercise",
        ],
        nutrition: Some(Nutrition {
            recommended: &[
                "Apples, cabbage, cauliflower",
                "Egg whites and lean meats (in moderation)",
                "Rice, pasta, and unsalted snacks",
            ],
            avoid: &[
                "Bananas, oranges, tomatoes (high potassium)",
                "Processed meats, pickles, and chips",
                "Colas and caffeine-heavy drinks",
            ],
        }),
        urgent: true,
        notes: "Seek medical care if you notice swelling, reduced urination, or frothy urine. Early diagnosis can \
                prevent kidney failure.",
    },
    Advice {
        condition: "Anemia",
        short: "Low hemoglobin or red blood cell count, which may cause fatigue and weakness.",
        avoid: &[
            "Skipping meals",
            "Tea or coffee right after meals",
            "Crash dieting without supervision",
        ],
        do_: &[
            "Eat iron-rich foods (spinach, beetroot, lentils, red meat, jaggery)",
            "Include vitamin C sources (orange, amla, lemon)",
            "Take iron supplements if prescribed",
            "Regular hemoglobin checkups",
        ],
        prevention: &[
            "Eat balanced meals",
            "Ensure adequate iron and folate intake",
            "Avoid long gaps between meals",
            "Regular health screening",
        ],
        nutrition: Some(Nutrition {
            recommended: &[
                "Leafy greens, pomegranate, beetroot, dates",
                "Lean meats and lentils",
                "Vitamin C-rich foods (orange, lemon, amla)",
            ],
            avoid: &[
                "Coffee/tea right after meals",
                "Excess dairy (can reduce iron absorption)",
            ],
        }),
        urgent: false,
        notes: "If you experience severe fatigue, dizziness, or shortness of breath, consult a doctor for blood tests.",
    },
    Advice {
        condition: "Dengue",
        short: "Possible dengue infection: monitor fever and hydration closely.",
        avoid: &[
            "Painkillers like ibuprofen or aspirin (increase bleeding risk)",
            "Dehydration",
            "Ignoring persistent vomiting or abdominal pain",
        ],
        do_: &[
            "Drink plenty of fluids (ORS, water, juices)",
            "Take paracetamol for fever (avoid NSAIDs)",
            "Rest as much as possible",
            "Monitor platelet count and temperature daily",
        ],
        prevention: &[
            "Avoid mosquito bites (use repellents, nets)",
            "Remove stagnant water near your home",
            "Wear long-sleeved clothing",
            "Stay indoors during mosquito-active hours",
        ],
        nutrition: Some(Nutrition {
            recommended: &[
                "Papaya leaves extract (if advised)",
                "Coconut water",
                "Pomegranate, kiwi, oranges",
                "Soups and juices",
            ],
            avoid: &["Caffeine", "Oily or spicy food", "Junk food"],
        }),
        urgent: true,
        notes: "If you notice bleeding, abdominal pain, or restlessness, visit a hospital immediately. Severe dengue \
                can be life-threatening.",
    },
];

/// Advice for `disease`, or the generic entry
pub fn lookup(disease: &str) -> &'static Advice {
    find(disease).unwrap_or(&DEFAULT)
}

/// Advice for `disease` if the catalog covers it
pub fn find(disease: &str) -> Option<&'static Advice> {
    let wanted = disease.trim();
    CATALOG
        .iter()
        .find(|a| a.condition.eq_ignore_ascii_case(wanted))
}

/// Conditions covered by the catalog
pub fn conditions() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|a| a.condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(lookup("heart disease").condition, "Heart Disease");
        assert_eq!(lookup("  DENGUE ").condition, "Dengue");
        assert!(lookup("Heart Disease").urgent);
        assert!(!lookup("flu").urgent);
    }

    #[test]
    fn test_unknown_gets_default() {
        let advice = lookup("Gout");
        assert_eq!(advice.condition, DEFAULT_CONDITION);
        assert!(advice.avoid.is_empty());
        assert_eq!(advice.do_.len(), 1);
        assert!(find("Gout").is_none());
    }

    #[test]
    fn test_catalog_entries() {
        let names: Vec<_> = conditions().collect();
        assert_eq!(names, ["Flu", "Heart Disease", "Kidney Disease", "Anemia", "Dengue"]);
        for name in names {
            let advice = lookup(name);
            assert!(!advice.short.is_empty());
            assert!(!advice.do_.is_empty());
            assert!(advice.nutrition.is_some());
        }
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(lookup("Anemia")).unwrap();
        assert!(json["do"].is_array());
        assert!(json["nutrition"]["recommended"].is_array());
        assert_eq!(json["urgent"], false);

        let fallback = serde_json::to_value(lookup("unknown")).unwrap();
        assert!(fallback.get("nutrition").is_none());
    }
}
