use recipe_dom::{
	config::Config,
	dom::{Document, NodeId},
	events::{Event, EventKind, Handlers},
	features::pagination::{self, PageState},
	view::{MountState, Outcome},
};
use std::{cell::RefCell, rc::Rc};
use tracing::Level;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_max_level(Level::TRACE).with_test_writer().try_init();
}

fn state(page: usize, result_count: usize) -> PageState {
	PageState {
		page,
		result_count,
		results_per_page: 10,
	}
}

fn setup() -> (Document, NodeId) {
	init_logging();
	let document = Document::from_markup(r#"<div class="pagination"></div>"#).unwrap();
	let mount = document.child_ids(document.root())[0];
	(document, mount)
}

/// `(goto, class)` of each rendered button.
fn buttons(document: &Document, mount: NodeId) -> Vec<(String, String)> {
	document
		.child_ids(mount)
		.iter()
		.map(|&button| {
			(
				document.get_attribute(button, "data-goto").unwrap().to_owned(),
				document.get_attribute(button, "class").unwrap().to_owned(),
			)
		})
		.collect()
}

#[test]
fn buttons_follow_the_decision_table() {
	let (mut document, mount) = setup();
	let mut view = pagination::view::<Document>(mount, &Config::default());

	let cases: &[(usize, usize, &[(&str, &str)])] = &[
		(1, 25, &[("2", "btn--inline pagination__btn--next")]),
		(2, 25, &[("1", "btn--inline pagination__btn--prev"), ("3", "btn--inline pagination__btn--next")]),
		(3, 25, &[("2", "btn--inline pagination__btn--prev")]),
		(1, 5, &[]),
		(1, 0, &[]),
	];
	for &(page, result_count, expected) in cases {
		view.render(&mut document, state(page, result_count)).unwrap();
		let expected: Vec<(String, String)> = expected.iter().map(|&(goto, class)| (goto.to_owned(), class.to_owned())).collect();
		assert_eq!(buttons(&document, mount), expected, "page {} of {} results", page, result_count);
		assert_eq!(view.state(), MountState::Rendered);
	}
}

#[test]
fn paging_forward_keeps_the_previous_button() {
	let (mut document, mount) = setup();
	let mut view = pagination::view::<Document>(mount, &Config::default());

	view.render(&mut document, state(2, 35)).unwrap();
	let previous = document.child_ids(mount)[0];
	assert_eq!(view.render_update(&mut document, state(3, 35)).unwrap(), Outcome::Patched(4));
	assert_eq!(document.child_ids(mount)[0], previous);
	assert_eq!(document.get_attribute(previous, "data-goto"), Some("2"));
	assert_eq!(buttons(&document, mount)[1].0, "4");
}

#[test]
fn clicks_report_the_target_page() {
	let (mut document, mount) = setup();
	let mut view = pagination::view::<Document>(mount, &Config::default());
	view.render(&mut document, state(2, 35)).unwrap();

	let pages = Rc::new(RefCell::new(Vec::new()));
	let mut handlers = Handlers::<Document>::new();
	{
		let pages = Rc::clone(&pages);
		pagination::add_handler_click(&mut handlers, mount, move |_, page| pages.borrow_mut().push(page));
	}

	// A click on the label inside the "next" button.
	let next = document.child_ids(mount)[1];
	let label = document.child_ids(next)[0];
	assert_eq!(document.name(label), Some("span"));
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, label));

	// The bare mount point isn't a button.
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, mount));

	let previous = document.child_ids(mount)[0];
	handlers.dispatch(&mut document, &Event::new(EventKind::Click, previous));

	assert_eq!(*pages.borrow(), vec![3, 1]);
}
