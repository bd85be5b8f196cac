/// Property-based tests using proptest
/// Invariants of the caller-number helpers for arbitrary input
use gen_ai_on_aws::phone::{can_receive_sms, format_phone_number, last_two_digits};
use proptest::prelude::*;

// Property: formatting and SMS checks never panic
proptest! {
    #[test]
    fn formatting_never_panics(phone in "\\PC*") {
        let formatted = format_phone_number(&phone);
        let _ = last_two_digits(&formatted);
        let _ = can_receive_sms(&phone);
    }

    #[test]
    fn formatted_output_is_never_empty(phone in "\\PC*") {
        prop_assert!(!format_phone_number(&phone).is_empty());
    }
}

// Property: country rules
proptest! {
    #[test]
    fn nanp_numbers_use_three_three_four_groups(
        area in 200u16..=999u16,
        exchange in 200u16..=999u16,
        line in 0u16..=9999u16
    ) {
        let phone = format!("+1{}{}{:04}", area, exchange, line);
        let formatted = format_phone_number(&phone);
        prop_assert_eq!(formatted, format!("+1 - {} - {} - {:04}", area, exchange, line));
    }

    #[test]
    fn german_groups_reassemble_to_input(rest in "[0-9]{1,14}") {
        let phone = format!("+49{}", rest);
        let formatted = format_phone_number(&phone);
        let tail = formatted.strip_prefix("+49 - ").unwrap();
        prop_assert_eq!(tail.replace(" - ", ""), rest.clone());
        prop_assert!(tail.split(" - ").all(|group| !group.is_empty() && group.len() <= 3));
    }

    #[test]
    fn german_sms_follows_mobile_prefix(second in 0u8..=9u8, rest in "[0-9]{6,10}") {
        let phone = format!("+491{}{}", second, rest);
        prop_assert_eq!(can_receive_sms(&phone), (5..=7).contains(&second));
    }

    #[test]
    fn non_german_numbers_can_receive_sms(country in "[1-35-9][0-9]{0,2}", rest in "[0-9]{6,10}") {
        let phone = format!("+{}{}", country, rest);
        prop_assert!(can_receive_sms(&phone));
    }

    #[test]
    fn unrecognized_numbers_are_unchanged(phone in "\\+[2-35-9][0-9]{4,12}") {
        prop_assert_eq!(format_phone_number(&phone), phone.clone());
    }
}

#[test]
fn anonymous_sentinels() {
    assert_eq!(format_phone_number(""), "Anonymous");
    assert_eq!(format_phone_number("Anonymous"), "Anonymous");
    assert!(!can_receive_sms(""));
    assert!(!can_receive_sms("Anonymous"));
}

#[test]
fn documented_formats() {
    assert_eq!(format_phone_number("+19093586520"), "+1 - 909 - 358 - 6520");
    assert_eq!(
        format_phone_number("+491234567890"),
        "+49 - 123 - 456 - 789 - 0"
    );
    assert_eq!(last_two_digits("+1 - 909 - 358 - 6520"), "20");
    assert!(can_receive_sms("+4915112345678"));
    assert!(!can_receive_sms("+4930123456"));
}
