mod common;

use bearlink_core::action::Action;
use bearlink_core::{NoteId, NoteService, NoteServiceError, RepoError, StoreError};
use common::{NewNote, RecordingChannel, StoreFixture};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn create_note_prepends_tag_line_before_body() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());

    service.create_note("X", "body", &tags(&["a", "b"])).unwrap();

    let request = service.writer().last();
    assert_eq!(request.action, Action::Create);
    assert_eq!(request.get("title"), Some("X"));
    assert_eq!(request.get("text"), Some("#a #b\n\nbody"));
    assert!(request.to_url("bear").contains("text=%23a%20%23b%0A%0Abody"));
}

#[test]
fn create_note_is_not_read_back() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());

    service.create_note("Fresh", "text", &[]).unwrap();

    // Dispatch alone never opens the store.
    assert_eq!(
        service.reader().store().state(),
        bearlink_core::StoreState::Uninitialized
    );
    assert!(service.search(Some("Fresh"), None).unwrap().is_empty());
}

#[test]
fn replace_content_serializes_title_then_tags_then_body() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());
    let id = NoteId::new("N1");

    service
        .replace_content(&id, "New title", "new body", &tags(&["work", "deep focus"]))
        .unwrap();

    let request = service.writer().last();
    assert_eq!(request.action, Action::AddText);
    assert_eq!(request.get("id"), Some("N1"));
    assert_eq!(request.get("mode"), Some("replace_all"));
    assert_eq!(
        request.get("text"),
        Some("# New title\n#work #deep focus#\n\nnew body")
    );
}

#[test]
fn replace_content_without_tags_has_no_tag_line() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());

    service
        .replace_content(&NoteId::new("N1"), "T", "body", &[])
        .unwrap();
    assert_eq!(service.writer().last().get("text"), Some("# T\n\nbody"));
}

#[test]
fn append_and_prepend_use_add_text_modes() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());
    let id = NoteId::new("N1");

    service.append_text(&id, "tail").unwrap();
    let append = service.writer().last();
    assert_eq!(append.action, Action::AddText);
    assert_eq!(append.get("mode"), Some("append"));
    assert_eq!(append.get("text"), Some("tail"));

    service.prepend_text(&id, "head").unwrap();
    let prepend = service.writer().last();
    assert_eq!(prepend.get("mode"), Some("prepend"));
    assert_eq!(prepend.get("text"), Some("head"));
}

#[test]
fn lifecycle_operations_dispatch_matching_actions() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());
    let id = NoteId::new("N1");

    service.trash_note(&id).unwrap();
    assert_eq!(service.writer().last().action, Action::Trash);
    service.archive_note(&id).unwrap();
    assert_eq!(service.writer().last().action, Action::Archive);
    service.unarchive_note(&id).unwrap();
    assert_eq!(service.writer().last().action, Action::Unarchive);
    assert_eq!(service.writer().count(), 3);
}

#[test]
fn tag_operations_normalize_names() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());

    service.rename_tag(" #old ", "new").unwrap();
    let rename = service.writer().last();
    assert_eq!(rename.action, Action::RenameTag);
    assert_eq!(rename.get("name"), Some("old"));
    assert_eq!(rename.get("new_name"), Some("new"));

    service.delete_tag("#old").unwrap();
    let delete = service.writer().last();
    assert_eq!(delete.action, Action::DeleteTag);
    assert_eq!(delete.get("name"), Some("old"));
}

#[test]
fn blank_inputs_are_rejected_before_dispatch() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());
    let blank = NoteId::new("  ");

    assert!(matches!(
        service.trash_note(&blank),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.append_text(&blank, "text"),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.get_note(&blank),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.rename_tag("#", "new"),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.rename_tag("same", "#same"),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        service.list_by_tag(" "),
        Err(NoteServiceError::InvalidInput(_))
    ));
    assert_eq!(service.writer().count(), 0);
}

#[test]
fn dispatch_failure_is_wrapped_as_write_error() {
    let fixture = StoreFixture::new();
    let service = NoteService::new(fixture.reader(), RecordingChannel::failing());

    let err = service.archive_note(&NoteId::new("N1")).unwrap_err();
    match &err {
        NoteServiceError::Write(bearlink_core::ActionError::DispatchFailed {
            action,
            params,
            ..
        }) => {
            assert_eq!(*action, Action::Archive);
            assert!(params.iter().any(|(k, v)| *k == "id" && v == "N1"));
        }
        other => panic!("expected dispatch failure, got {other:?}"),
    }
    assert!(err.to_string().contains("action call failed"));
}

#[test]
fn reads_go_through_the_store() {
    let fixture = StoreFixture::new();
    fixture.insert(NewNote::new("P1", "Project Plan").tags(&["Work"]));
    fixture.insert(NewNote::new("P2", "Old project").trashed());
    fixture.insert(NewNote::new("A1", "Shelved").archived());
    let service = NoteService::new(fixture.reader(), RecordingChannel::default());

    let found = service.search(Some("project"), None).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].content.is_none());

    assert_eq!(service.search(None, None).unwrap().len(), 1);
    assert_eq!(service.list_by_tag("work").unwrap().len(), 1);
    assert_eq!(service.list_archived().unwrap()[0].id, NoteId::new("A1"));
    assert_eq!(service.list_tags().unwrap()[0].name, "Work");
    assert!(service.get_note(&NoteId::new("nope")).unwrap().is_none());
}

#[test]
fn shutdown_closes_the_store() {
    let fixture = StoreFixture::new();
    let mut service = NoteService::new(fixture.reader(), RecordingChannel::default());
    service.list_tags().unwrap();

    service.shutdown();
    service.shutdown();

    let err = service.list_tags().unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Read(RepoError::Store(StoreError::Closed))
    ));
}
