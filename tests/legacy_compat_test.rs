//! Compatibility tests for the deprecated group-based entry points

use deid::annotate::AnnotatorLibrary;
use deid::domain::Category;
use deid::legacy::{annotate_text, annotate_text_structured, deidentify_annotations, LegacyOptions};
use deid::{cluster_tags, Deidentifier};

fn deidentifier() -> Deidentifier {
    Deidentifier::new(AnnotatorLibrary::default_library().expect("Failed to load built-in library"))
}

fn only_dates() -> LegacyOptions {
    LegacyOptions {
        names: false,
        institutions: false,
        locations: false,
        phone_numbers: false,
        patient_numbers: false,
        ages: false,
        urls: false,
        ..LegacyOptions::default()
    }
}

#[test]
fn test_annotate_then_deidentify_matches_pipeline() {
    let deidentifier = deidentifier();
    let options = LegacyOptions {
        patient_surname: "Visscher".to_string(),
        ..LegacyOptions::default()
    };
    let text = "Mevr. Visscher woont in Utrecht en werkt in Utrecht.";

    let tagged = annotate_text(&deidentifier, text, &options).unwrap().into_value();
    assert_eq!(
        tagged,
        "Mevr. <PATIENT Visscher> woont in <LOCATION Utrecht> en werkt in <LOCATION Utrecht>."
    );

    let numbered = deidentify_annotations(&tagged).into_value();
    assert_eq!(numbered, "Mevr. <PATIENT> woont in <LOCATION-1> en werkt in <LOCATION-1>.");

    let direct = deidentifier
        .deidentify(text, Some(options.annotator_names().as_slice()), options.metadata())
        .unwrap();
    assert_eq!(direct.redacted_text, numbered);
}

#[test]
fn test_group_switches() {
    let tagged = annotate_text(&deidentifier(), "Op 12-03-2020 in Utrecht", &only_dates())
        .unwrap()
        .into_value();
    assert_eq!(tagged, "Op <DATE 12-03-2020> in Utrecht");
}

#[test]
fn test_structured_annotations() {
    let result =
        annotate_text_structured(&deidentifier(), "Op 12-03-2020 en 3 mei 2021", &only_dates())
            .unwrap();

    let annotations = result.value;
    assert_eq!(annotations.len(), 2);
    assert!(annotations.iter().all(|a| a.tag() == Category::Date));
    assert_eq!(annotations[1].text(), "3 mei 2021");
    assert!(result.warning.contains("annotate_text_structured"));
}

#[test]
fn test_deidentify_annotations_matches_cluster_tags() {
    let tagged = "<NAME Jansen> and <NAME Janssen> and <NAME Peters>";
    assert_eq!(deidentify_annotations(tagged).into_value(), cluster_tags(tagged));
}

#[test]
fn test_missing_group_annotator_is_reported() {
    let library = AnnotatorLibrary::from_toml(
        r#"
[annotators.date_1]
kind = "regex"
category = "date"
patterns = ['\b\d{2}-\d{2}-\d{4}\b']
"#,
    )
    .unwrap();
    let deidentifier = Deidentifier::new(library);

    assert!(annotate_text(&deidentifier, "12-03-2020", &only_dates()).is_err());
}
