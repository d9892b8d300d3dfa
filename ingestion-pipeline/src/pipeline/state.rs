use state_machines::state_machine;

state_machine! {
    name: MediaMachine,
    state: MediaState,
    initial: Pending,
    states: [
        Pending,
        AuthorResolved,
        MediaCreated,
        SnippetsPersisting,
        Done,
        AuthorResolutionFailed,
        MediaCreationFailed
    ],
    events {
        author_resolved { transition: { from: Pending, to: AuthorResolved } }
        media_created { transition: { from: AuthorResolved, to: MediaCreated } }
        persist_snippets { transition: { from: MediaCreated, to: SnippetsPersisting } }
        finish { transition: { from: SnippetsPersisting, to: Done } }
        author_failed { transition: { from: Pending, to: AuthorResolutionFailed } }
        media_failed { transition: { from: AuthorResolved, to: MediaCreationFailed } }
    }
}

pub fn pending() -> MediaMachine<(), Pending> {
    MediaMachine::new(())
}
