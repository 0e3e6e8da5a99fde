/// Property-based tests using proptest
use kyc_onboarding::models::{
    parse_birth_date, Analysis, ContentKind, CustomerField, ImageFile, IDENTITY_SLOT,
};
use kyc_onboarding::submission::build_payload;
use kyc_onboarding::wizard::{VerificationOutcome, VerificationPlan, WizardSession};
use proptest::prelude::*;

// Birth date parsing
proptest! {
    #[test]
    fn birth_date_parsing_never_panics(raw in "\\PC*") {
        let _ = parse_birth_date(&raw);
    }

    #[test]
    fn dash_and_slash_dates_agree(year in 1900i32..=2024, month in 1u32..=12, day in 1u32..=28) {
        let dashed = parse_birth_date(&format!("{:04}-{:02}-{:02}", year, month, day));
        let slashed = parse_birth_date(&format!("{:04}/{:02}/{:02}", year, month, day));
        prop_assert!(dashed.is_some());
        prop_assert_eq!(dashed, slashed);
    }
}

// Step controller
proptest! {
    #[test]
    fn advance_blocked_while_any_field_blank(
        blanks in proptest::collection::vec(proptest::bool::ANY, 5),
        whitespace in "[ \\t]{0,3}"
    ) {
        let mut session = WizardSession::new();
        let values = ["Jane Doe", "555-1111", "1990-01-01", "ID123", "1 Main St"];
        for ((field, value), blank) in CustomerField::REQUIRED.iter().zip(values).zip(&blanks) {
            let value = if *blank { whitespace.clone() } else { value.to_string() };
            session.set_field(*field, value);
        }

        let any_blank = blanks.iter().any(|b| *b);
        let result = session.advance();
        prop_assert_eq!(result.is_err(), any_blank);
        prop_assert_eq!(session.step().index(), if any_blank { 0 } else { 1 });
    }
}

// Submission payload
#[derive(Debug, Clone)]
enum SupportingAction {
    Empty(ContentKind),
    BlankText,
    Text(String),
    UploadedImage,
    FailedImage,
}

fn supporting_action() -> impl Strategy<Value = SupportingAction> {
    prop_oneof![
        prop_oneof![Just(ContentKind::Image), Just(ContentKind::Text)].prop_map(SupportingAction::Empty),
        Just(SupportingAction::BlankText),
        "[a-zA-Z][a-zA-Z ]{0,20}".prop_map(SupportingAction::Text),
        Just(SupportingAction::UploadedImage),
        Just(SupportingAction::FailedImage),
    ]
}

fn verified_session() -> WizardSession {
    let mut session = WizardSession::new();
    session.set_field(CustomerField::FullName, "Jane Doe");
    session.set_field(CustomerField::Phone, "555-1111");
    session.set_field(CustomerField::DateOfBirth, "1990-01-01");
    session.set_field(CustomerField::IdNumber, "ID123");
    session.set_field(CustomerField::Address, "1 Main St");

    let round = session
        .begin_image(IDENTITY_SLOT, ImageFile::new("cin.jpg", b"img".to_vec()))
        .unwrap();
    session.record_upload(round.tag, "obj-42".to_string());
    session.finish_analysis(round.tag, Analysis::scored(Some(85.0), vec![]));
    if let VerificationPlan::Remote(round) = session.begin_verification(IDENTITY_SLOT).unwrap() {
        session.finish_verification(&round, VerificationOutcome::Verified);
    }
    session
}

proptest! {
    #[test]
    fn payload_skips_slots_without_content(
        actions in proptest::collection::vec(supporting_action(), 0..8)
    ) {
        let mut session = verified_session();
        let mut expected = 1;

        for (i, action) in actions.into_iter().enumerate() {
            match action {
                SupportingAction::Empty(kind) => {
                    session.add_supporting(kind);
                }
                SupportingAction::BlankText => {
                    let id = session.add_supporting(ContentKind::Text);
                    session.begin_text(id, "   ".to_string()).unwrap();
                }
                SupportingAction::Text(text) => {
                    let id = session.add_supporting(ContentKind::Text);
                    let round = session.begin_text(id, text).unwrap().unwrap();
                    session.finish_analysis(round.tag, Analysis::scored(Some(50.0), vec![]));
                    expected += 1;
                }
                SupportingAction::UploadedImage => {
                    let id = session.add_supporting(ContentKind::Image);
                    let round = session
                        .begin_image(id, ImageFile::new(format!("s{}.jpg", i), b"s".to_vec()))
                        .unwrap();
                    session.record_upload(round.tag, format!("obj-s{}", i));
                    session.finish_analysis(round.tag, Analysis::scored(None, vec![]));
                    expected += 1;
                }
                SupportingAction::FailedImage => {
                    let id = session.add_supporting(ContentKind::Image);
                    let round = session
                        .begin_image(id, ImageFile::new(format!("f{}.jpg", i), b"f".to_vec()))
                        .unwrap();
                    session.fail_analysis(round.tag, round.failure_message());
                }
            }
        }

        let payload = build_payload(&session).unwrap();
        prop_assert_eq!(payload.documents.len(), expected);
        for document in &payload.documents[1..] {
            prop_assert!(document.file_url.is_some() || document.content.is_some());
        }
    }
}

// Stale results
proptest! {
    #[test]
    fn only_latest_attachment_result_applies(attempts in 2usize..6) {
        let mut session = WizardSession::new();
        let id = session.add_supporting(ContentKind::Image);

        let mut rounds = Vec::new();
        for i in 0..attempts {
            let round = session
                .begin_image(id, ImageFile::new(format!("{}.jpg", i), b"x".to_vec()))
                .unwrap();
            rounds.push(round.clone());
            if i + 1 < attempts {
                // Slot must be idle before the next attach.
                session.fail_analysis(round.tag, round.failure_message());
            }
        }

        let (latest, stale) = rounds.split_last().unwrap();
        for round in stale {
            prop_assert!(!session.finish_analysis(round.tag, Analysis::scored(Some(1.0), vec![])));
        }
        prop_assert!(session.finish_analysis(latest.tag, Analysis::scored(Some(99.0), vec![])));
        prop_assert_eq!(
            session.slot(id).unwrap().quality_score().value(),
            Some(99.0)
        );
    }
}
