//! Rice leaf classes known to the classifier.
//!
//! Position `i` in [`CLASSES`] is the class the model reports at output
//! index `i`. The artifact carries no label metadata, so this ordering is
//! the only link between scores and names.

pub const NO_SYMPTOMS: &str = "No symptoms available.";
pub const NO_TREATMENT: &str = "No treatment information available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    pub label: &'static str,
    pub symptoms: &'static str,
    pub treatment: &'static str,
}

pub const CLASSES: [ClassEntry; 9] = [
    ClassEntry {
        label: "bacterial_leaf_blight",
        symptoms: "Water-soaked lesions that enlarge and form blighted areas.",
        treatment: "Use resistant rice varieties and apply copper-based fungicides.",
    },
    ClassEntry {
        label: "brown_spot",
        symptoms: "Small, round brown lesions on leaves.",
        treatment: "Improve soil fertility with potassium and apply fungicides like Mancozeb.",
    },
    ClassEntry {
        label: "healthy",
        symptoms: "No visible disease symptoms, healthy rice leaves.",
        treatment: "No treatment necessary. Ensure proper maintenance of rice field conditions.",
    },
    ClassEntry {
        label: "leaf_blast",
        symptoms: "Diamond-shaped lesions with white to gray centers.",
        treatment: "Apply tricyclazole fungicides and maintain optimal water levels in the field.",
    },
    ClassEntry {
        label: "leaf_scald",
        symptoms: "Yellowish or brown lesions along leaf margins.",
        treatment: "Use resistant varieties and avoid excessive nitrogen fertilizer.",
    },
    ClassEntry {
        label: "narrow_brown_spot",
        symptoms: "Narrow, dark brown streaks on leaves.",
        treatment: "Apply fungicides like Propiconazole and reduce plant density.",
    },
    ClassEntry {
        label: "rice_hispa",
        symptoms: "Parallel feeding scars and windowpane-like holes in leaves caused by insect feeding.",
        treatment: "Use insecticides like Chlorpyrifos and conduct field sanitation.",
    },
    ClassEntry {
        label: "sheath_blight",
        symptoms: "Oval-shaped lesions on leaf sheaths, often leading to wilting.",
        treatment: "Apply fungicides like Azoxystrobin and ensure proper spacing between plants.",
    },
    ClassEntry {
        label: "tungro",
        symptoms: "Stunted growth, yellow-orange discoloration of leaves.",
        treatment: "Use virus-free seedlings and control green leafhoppers with insecticides.",
    },
];

pub fn label_at(index: usize) -> Option<&'static str> {
    CLASSES.get(index).map(|entry| entry.label)
}

/// Symptom and treatment text for `label`, falling back to the placeholder
/// strings for anything outside the table.
pub fn details_for(label: &str) -> (&'static str, &'static str) {
    CLASSES
        .iter()
        .find(|entry| entry.label == label)
        .map(|entry| (entry.symptoms, entry.treatment))
        .unwrap_or((NO_SYMPTOMS, NO_TREATMENT))
}
