use pretty_assertions::assert_eq;
use segue_ports::types::Fraction;

#[test]
fn zero_denominator_is_treated_as_one() {
    let built = Fraction::new(3, 0);
    assert_eq!((built.numerator(), built.denominator()), (3, 1));

    let parsed: Fraction =
        serde_json::from_str(r#"{ "numerator": 3, "denominator": 0 }"#).expect("parse");
    assert_eq!(parsed.denominator(), 1);
    assert_eq!(parsed.real_value(), 3.0);
    assert_eq!(parsed.to_ticks(1024), 3072);
    assert_eq!(parsed.to_string(), "3/1");
}

#[test]
fn ticks_round_to_nearest() {
    assert_eq!(Fraction::new(1, 4).to_ticks(1024), 256);
    assert_eq!(Fraction::new(1, 3).to_ticks(1024), 341);
    assert_eq!(Fraction::new(2, 3).to_ticks(1024), 683);
}
