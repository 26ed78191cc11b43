use super::*;
use proptest::prelude::*;

/// 小さなアドレス空間から選ぶことで衝突（マージ）を起こしやすくする
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-e]@x\\.com".prop_map(|s| s)
}

fn group_strategy() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    (
        prop::collection::vec(email_strategy(), 0..4),
        prop::collection::vec("[A-Z][a-z]{0,5}", 0..3),
    )
}

fn build(groups: &[(Vec<String>, Vec<String>)]) -> Vec<SourceGroup> {
    groups
        .iter()
        .enumerate()
        .map(|(i, (emails, names))| {
            SourceGroup::new(format!("K{}", i), format!("urn:K{}", i))
                .with_emails(emails.iter().map(String::as_str))
                .with_names(names.iter().map(String::as_str))
        })
        .collect()
}

proptest! {
    /// 同じ入力を2回畳み込むと同じ結果になる
    #[test]
    fn prop_fold_is_deterministic(groups in prop::collection::vec(group_strategy(), 0..12)) {
        let first = fold(build(&groups));
        let second = fold(build(&groups));
        prop_assert_eq!(first, second);
    }

    /// メールを持たないカードは作られない
    #[test]
    fn prop_no_card_without_email(groups in prop::collection::vec(group_strategy(), 0..12)) {
        for card in fold(build(&groups)) {
            prop_assert!(!card.emails().is_empty());
        }
    }

    /// メールを持つグループはちょうど1枚のカードに付き、そのカードはグループの全メールを含む
    #[test]
    fn prop_each_group_attaches_to_exactly_one_card(
        groups in prop::collection::vec(group_strategy(), 0..12)
    ) {
        let built = build(&groups);
        let cards = fold(built.clone());

        for group in built.iter().filter(|g| g.has_emails()) {
            let key = format!("urn:{}", group.token());
            let holders: Vec<&Card> = cards
                .iter()
                .filter(|c| c.values(crate::card::LineName::Key).any(|k| k == key))
                .collect();
            prop_assert_eq!(holders.len(), 1);
            for email in group.emails() {
                prop_assert!(holders[0].has_email(email));
            }
        }
    }

    /// カード数はメールを持つグループ数を超えない
    #[test]
    fn prop_card_count_bounded(groups in prop::collection::vec(group_strategy(), 0..12)) {
        let built = build(&groups);
        let with_email = built.iter().filter(|g| g.has_emails()).count();
        prop_assert!(fold(built).len() <= with_email);
    }
}
