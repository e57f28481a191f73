use clap::Subcommand;
use scrollgate_core::SessionFileKv;

#[derive(Subcommand)]
pub enum SessionAction {
    /// End the session, dropping its volatile state (like closing the tab)
    End,
    /// Print where the session's volatile state is kept
    Path,
}

pub fn run(session: &str, action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut kv = SessionFileKv::open_session(session)?;
    match action {
        SessionAction::End => {
            kv.end_session()?;
            println!("session '{session}' ended");
        }
        SessionAction::Path => {
            println!("{}", kv.path().display());
        }
    }
    Ok(())
}
