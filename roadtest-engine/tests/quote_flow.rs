use roadtest_engine::{
    AddonId, BookingConfiguration, BookingSession, DisabledReason, NoOpReason, QuoteLineKind,
    TestType, Transition, format_dollars,
};

fn session(config: BookingConfiguration) -> BookingSession {
    BookingSession::with_standard_pricing(config).expect("valid configuration")
}

#[test]
fn far_pickup_grant_upgrade_and_downgrade() {
    let mut booking = session(BookingConfiguration::pickup(TestType::G2, 120.0, 8_000));

    let quote = booking.quote().unwrap();
    assert_eq!(quote.total_display(), "165.00");
    let free = booking.state().free_lesson().expect("free lesson granted");
    assert!(free.display_name.contains("1-Hour"));
    let before = free.clone();

    assert!(booking.upgrade().is_applied());
    let items = booking.state().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, AddonId::MockTest);
    assert_eq!(items[0].price_cents, 4_000);
    assert_eq!(booking.quote().unwrap().total_display(), "205.00");

    assert!(booking.downgrade().is_applied());
    assert_eq!(booking.state().free_lesson(), Some(&before));
    assert_eq!(booking.quote().unwrap().total_cents, 16_500);
}

#[test]
fn replace_on_toggle_differs_from_hard_disable() {
    let mut booking = session(BookingConfiguration::pickup(TestType::G2, 10.0, 8_000));
    booking.toggle(AddonId::MockTest);
    let catalog = booking.catalog();
    let lesson = catalog
        .iter()
        .find(|entry| entry.item.id == AddonId::Lesson1Hr)
        .unwrap();
    assert!(lesson.is_disabled_for_selection());
    assert_eq!(booking.toggle(AddonId::Lesson1Hr), Transition::Applied);
    assert!(booking.state().contains(AddonId::Lesson1Hr));
    assert!(!booking.state().contains(AddonId::MockTest));

    let mut far = session(BookingConfiguration::pickup(TestType::G2, 130.0, 8_000));
    let before = far.state().clone();
    assert_eq!(
        far.toggle(AddonId::Lesson1Hr),
        Transition::NoOp(NoOpReason::Disabled {
            reason: DisabledReason::FreeLessonHeld {
                duration: roadtest_engine::LessonDuration::OneHour
            }
        })
    );
    assert_eq!(far.state(), &before);
}

#[test]
fn meet_at_centre_far_away_earns_nothing() {
    let mut booking = session(BookingConfiguration::new(TestType::G, true, 145.0, 9_500));
    assert!(booking.state().is_empty());
    booking.toggle(AddonId::MockTest);
    let quote = booking.quote().unwrap();
    assert_eq!(quote.total_cents, 19_500);
    assert!(quote.transport.is_none());
    assert!(
        quote
            .breakdown
            .iter()
            .all(|line| line.kind != QuoteLineKind::FreeDropoff)
    );
}

#[test]
fn switching_from_pickup_to_centre_keeps_granted_lesson() {
    let mut booking = session(BookingConfiguration::pickup(TestType::G2, 75.0, 8_000));
    let granted = booking.state().free_lesson().cloned().unwrap();
    assert_eq!(granted.original_price_cents, 2_500);

    booking
        .reconfigure(BookingConfiguration::at_centre(TestType::G2, 8_000))
        .unwrap();
    assert_eq!(booking.state().free_lesson(), Some(&granted));
    assert_eq!(booking.quote().unwrap().total_cents, 8_000);

    let offer = booking.upgrade_offer().unwrap();
    assert_eq!(format_dollars(offer.price_cents), "$50.00");
}
