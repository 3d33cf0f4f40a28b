pub mod athlete;
pub mod auth_event;
pub mod club;
pub mod download;
pub mod template;
pub mod visit;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::athlete::{self, Entity as Athlete};
    pub use super::auth_event::{self, Entity as AuthEvent};
    pub use super::club::{self, Entity as Club};
    pub use super::download::{self, Entity as Download};
    pub use super::template::{self, Entity as Template, TemplateStatus};
    pub use super::visit::{self, Entity as Visit};
}
