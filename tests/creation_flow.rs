//! End-to-end character creation against the in-memory host fixtures.

use emberfall_core::actor::{Application, ApplicationScores, Axis, AxisScores, BonusTarget};
use emberfall_core::creation::{
    check_step, ChoiceKind, CreationWizard, SingletonKind, StepRequirement, WizardOutcome,
    CREATION_COMPLETE_FLAG,
};
use emberfall_core::items::ItemKind;
use emberfall_core::testing::{sample_actor, sample_catalog, RecordingHost};
use emberfall_core::{Catalog, WizardError};

#[tokio::test]
async fn full_walkthrough_builds_a_finished_character() {
    let mut actor = sample_actor("Brakka");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    // step 1: pools
    wizard
        .apply_pools(AxisScores::new(2, 2, 2), ApplicationScores::new(2, 2, 2))
        .await
        .unwrap();
    wizard.advance().await.unwrap();

    // step 2: ancestry, bonus, traits
    wizard
        .select_singleton(
            SingletonKind::Ancestry,
            catalog.find(ItemKind::Ancestry, "Stonekin"),
        )
        .await
        .unwrap();
    wizard
        .set_primary_bonus(BonusTarget::Axis(Axis::Physical))
        .await
        .unwrap();
    for name in ["Night Vision", "Stone Sense", "Silent Step"] {
        wizard
            .add_choice(ChoiceKind::AncestryTrait, catalog.find(ItemKind::Trait, name))
            .await
            .unwrap();
    }
    wizard.advance().await.unwrap();

    // step 3: background and talent
    wizard
        .select_singleton(
            SingletonKind::Background,
            catalog.find(ItemKind::Background, "Caravan Guard"),
        )
        .await
        .unwrap();
    wizard
        .add_choice(
            ChoiceKind::BackgroundTalent,
            catalog.find(ItemKind::Talent, "Watchful"),
        )
        .await
        .unwrap();
    wizard.advance().await.unwrap();

    // step 4: class, passive, class talents
    wizard
        .select_singleton(SingletonKind::Class, catalog.find(ItemKind::Class, "Warden"))
        .await
        .unwrap();
    for name in ["Steady Hands", "Shield Discipline"] {
        wizard
            .add_choice(ChoiceKind::ClassTalent, catalog.find(ItemKind::Talent, name))
            .await
            .unwrap();
    }
    wizard.advance().await.unwrap();

    // step 5: one maneuver per effective attribute point
    for name in ["Power Strike", "Sweep", "Brace"] {
        wizard
            .add_choice(ChoiceKind::Maneuver, catalog.find(ItemKind::Maneuver, name))
            .await
            .unwrap();
    }
    for name in ["Feint Read", "Battle Plan", "Taunt", "Rally"] {
        wizard
            .add_choice(ChoiceKind::Maneuver, catalog.find(ItemKind::Maneuver, name))
            .await
            .unwrap();
    }
    wizard.advance().await.unwrap();

    // step 6: the Warden is no caster, so this step is already complete
    wizard.advance().await.unwrap();

    // step 7: equipment inside the budget
    for (kind, name) in [
        (ItemKind::Weapon, "Longsword"),
        (ItemKind::Armor, "Leather Armor"),
        (ItemKind::Equipment, "Rope"),
        (ItemKind::Consumable, "Rations"),
    ] {
        wizard
            .buy_equipment(catalog.find(kind, name))
            .await
            .unwrap();
    }

    let outcome = wizard.finish().await.unwrap();
    assert_eq!(outcome, WizardOutcome::Finished);

    let summary = wizard.summary();
    assert_eq!(summary.step, 8);
    assert!(summary.steps.iter().all(|s| s.complete));
    assert_eq!(summary.class.as_deref(), Some("Warden"));
    assert_eq!(summary.spent_gold, 15.0 + 10.0 + 0.5 + 2.5);

    // the ancestry bonus landed on the physical axis
    assert_eq!(actor.axes.physical, 3);
    // derived stats were recomputed on the way out
    assert_eq!(actor.resources.hp.max, 10 + (3 + 2) * 5);
    assert_eq!(actor.get_flag::<bool>(CREATION_COMPLETE_FLAG), Some(true));
    assert!(host.actors.contains_key(&actor.id));
}

#[tokio::test]
async fn forward_jump_halts_at_first_incomplete_step() {
    let mut actor = sample_actor("Hasty");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    wizard.advance().await.unwrap();
    assert_eq!(wizard.state().step, 2);

    // no ancestry yet: jumping to the end parks the wizard at step 2
    let outcome = wizard.go_to_step(8).await.unwrap();
    assert_eq!(
        outcome,
        WizardOutcome::Halted {
            step: 2,
            requirement: StepRequirement::AncestryChoice
        }
    );
    assert_eq!(wizard.state().step, 2);

    // backward jumps are unconditional
    let outcome = wizard.go_to_step(1).await.unwrap();
    assert_eq!(outcome, WizardOutcome::Moved { step: 1 });
}

#[tokio::test]
async fn finish_halts_like_a_forward_jump() {
    let mut actor = sample_actor("Unready");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    let outcome = wizard.finish().await.unwrap();
    assert!(matches!(
        outcome,
        WizardOutcome::Halted {
            step: 2,
            requirement: StepRequirement::AncestryChoice
        }
    ));
    assert_eq!(actor.get_flag::<bool>(CREATION_COMPLETE_FLAG), None);
}

#[tokio::test]
async fn casters_must_pick_a_starting_spell() {
    let mut actor = sample_actor("Ashka");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    wizard
        .select_singleton(
            SingletonKind::Class,
            catalog.find(ItemKind::Class, "Thaumaturge"),
        )
        .await
        .unwrap();

    assert_eq!(
        check_step(wizard.actor(), wizard.state(), 6),
        Err(StepRequirement::StartingSpell)
    );

    wizard
        .add_choice(ChoiceKind::Spell, catalog.find(ItemKind::Spell, "Ember Lash"))
        .await
        .unwrap();
    assert_eq!(check_step(wizard.actor(), wizard.state(), 6), Ok(()));
}

#[tokio::test]
async fn overspending_is_rejected_and_removal_refunds() {
    let mut actor = sample_actor("Magpie");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    wizard
        .buy_equipment(catalog.find(ItemKind::Weapon, "Greatsword"))
        .await
        .unwrap();

    // 25 spent; plate at 28 gold overshoots
    let err = wizard
        .buy_equipment(catalog.find(ItemKind::Armor, "Plate Harness"))
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::BudgetExceeded { .. }));

    let sword_id = wizard.actor().items[0].id;
    wizard.remove_equipment(sword_id).await.unwrap();
    wizard
        .buy_equipment(catalog.find(ItemKind::Armor, "Plate Harness"))
        .await
        .unwrap();
    assert_eq!(wizard.summary().spent_gold, 28.0);
}

#[tokio::test]
async fn state_survives_a_reload() {
    let mut actor = sample_actor("Persistent");
    let catalog = sample_catalog();

    {
        let mut host = RecordingHost::default();
        let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);
        wizard
            .apply_pools(AxisScores::new(3, 2, 1), ApplicationScores::new(1, 2, 3))
            .await
            .unwrap();
        wizard.advance().await.unwrap();
    }

    // a new wizard over the same actor resumes at step 2 with the pools
    let mut host = RecordingHost::default();
    let wizard = CreationWizard::new(&mut actor, &mut host, &catalog);
    assert_eq!(wizard.state().step, 2);
    assert_eq!(wizard.state().base_axes, AxisScores::new(3, 2, 1));
    assert_eq!(
        wizard.state().base_applications,
        ApplicationScores::new(1, 2, 3)
    );
}

#[tokio::test]
async fn extra_bonus_requires_granting_ancestry() {
    let mut actor = sample_actor("Grounded");
    let mut host = RecordingHost::default();
    let catalog = sample_catalog();
    let mut wizard = CreationWizard::new(&mut actor, &mut host, &catalog);

    wizard
        .select_singleton(
            SingletonKind::Ancestry,
            catalog.find(ItemKind::Ancestry, "Stonekin"),
        )
        .await
        .unwrap();

    let err = wizard
        .set_extra_bonus(Application::Resistance)
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::ExtraBonusNotAvailable { .. }));
}
