//! Editor sessions driven from extracted PDFs.

mod common;

use common::{sample_page, text_at, PdfFixture};
use pdfdeck::{
    CardContent, Editor, EditorConfig, HitTarget, Interaction, Key, KindFilter, Pdfdeck, Point,
    StyleUpdate,
};

fn sample_editor(populate: bool) -> Editor {
    let pdf = PdfFixture::new()
        .page(sample_page())
        .page(text_at(72, 700, "Closing remarks"))
        .to_bytes();
    Pdfdeck::new().populate(populate).open_bytes(&pdf).unwrap()
}

#[test]
fn test_one_slide_per_page() {
    let editor = sample_editor(false);
    assert_eq!(editor.deck().len(), 2);
    assert_eq!(editor.current_index(), Some(0));
    assert_eq!(editor.deck().card_count(), 0);
    let pages: Vec<_> = editor.deck().slides.iter().map(|s| s.source_page).collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);
}

#[test]
fn test_populate_places_elements_on_their_pages() {
    let editor = sample_editor(true);
    let first = &editor.deck().slides[0];
    let second = &editor.deck().slides[1];
    assert_eq!(first.cards.len(), 3);
    assert_eq!(second.cards.len(), 1);
    assert_eq!(editor.current_index(), Some(0));
    assert!(editor.selected_card().is_none());
    assert!(first.cards.iter().all(|c| !c.selected));

    // Cascade: 50 + 20N, z = N + 1.
    let positions: Vec<_> = first.cards.iter().map(|c| (c.position.x, c.z_order)).collect();
    assert_eq!(positions, vec![(50.0, 1), (70.0, 2), (90.0, 3)]);
}

#[test]
fn test_add_library_element_by_hand() {
    let mut editor = sample_editor(false);
    let element = editor
        .library()
        .filter(KindFilter::Text)
        .next()
        .map(|e| e.id)
        .unwrap();
    let card = editor.add_element_to_slide(element).unwrap();

    match &editor.card(card).unwrap().content {
        CardContent::Text { text, style } => {
            assert_eq!(text, "Hello world");
            assert_eq!(style.font_size, 16.0);
        }
        other => panic!("expected a text card, got {:?}", other),
    }
    assert!(editor.selected_card().is_none());
    assert!(editor.select_card(card));
    assert!(editor.card(card).unwrap().selected);
}

#[test]
fn test_drag_resize_and_keyboard() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_slide();
    let card = editor.add_text_card().unwrap();

    assert!(editor.pointer_down(card, HitTarget::Body, Point::new(110.0, 110.0)));
    assert!(matches!(editor.interaction(), Interaction::Dragging { .. }));
    editor.pointer_move(Point::new(5000.0, 5000.0));
    let moved = editor.card(card).unwrap();
    assert_eq!((moved.position.x, moved.position.y), (560.0, 440.0));
    editor.pointer_up();
    assert!(editor.interaction().is_idle());

    assert!(editor.pointer_down(card, HitTarget::ResizeHandle, Point::new(0.0, 0.0)));
    editor.pointer_move(Point::new(0.0, 0.0));
    let resized = editor.card(card).unwrap();
    assert_eq!((resized.size.width, resized.size.height), (100.0, 50.0));
    editor.pointer_up();

    assert!(!editor.pointer_down(card, HitTarget::Toolbar, Point::new(0.0, 0.0)));
    assert!(editor.handle_key(Key::Escape));
    assert!(editor.selected_card().is_none());

    editor.select_card(card);
    assert!(editor.handle_key(Key::Delete));
    assert!(editor.card(card).is_none());
}

#[test]
fn test_style_and_correction_survive_only_while_card_exists() {
    let mut editor = sample_editor(true);
    let card = editor.current_slide().unwrap().cards[0].id;

    assert!(editor.update_card_style(card, StyleUpdate::FontSize(28.0)));
    assert!(!editor.update_card_style(card, StyleUpdate::FontSize(0.0)));

    let target = editor.capture(card).unwrap();
    assert_eq!(editor.target_text(target), Some("Hello world"));
    assert!(editor.apply_text_correction(target, "Hello world."));
    assert_eq!(editor.target_text(target), Some("Hello world."));

    editor.delete_card(card);
    assert!(!editor.apply_text_correction(target, "too late"));
}

#[test]
fn test_delete_slides_until_empty() {
    let mut editor = sample_editor(true);
    editor.select_slide(1);
    assert!(editor.delete_current_slide().is_some());
    assert_eq!(editor.current_index(), Some(0));
    assert!(editor.delete_current_slide().is_some());
    assert_eq!(editor.current_index(), None);
    assert!(editor.delete_current_slide().is_none());
    assert!(editor.add_text_card().is_none());
}
