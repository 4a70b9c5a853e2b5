use crate::application::ports::{ChatClient, DocumentRenderer};
use crate::application::services::SessionController;
use crate::presentation::config::ViewerSettings;

pub struct AppState<R: ?Sized, C: ?Sized>
where
    R: DocumentRenderer,
    C: ChatClient,
{
    pub session: SessionController<R, C>,
    pub viewer: ViewerSettings,
}

impl<R: ?Sized, C: ?Sized> Clone for AppState<R, C>
where
    R: DocumentRenderer,
    C: ChatClient,
{
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            viewer: self.viewer.clone(),
        }
    }
}
