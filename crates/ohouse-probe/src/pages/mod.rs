//! Page models for the Ohouse app and the system screens around it.
//!
//! Each page is a locator catalog plus composite actions over
//! [`BasePage`](crate::page_object::BasePage). Pages deref to the base, so
//! shared actions read the same on every page.

pub mod app_drawer;
pub mod email_login;
pub mod login;
pub mod main_home;
pub mod my_page;
pub mod playstore;
pub mod search_results;
pub mod setting;
pub mod splash;

pub use app_drawer::AppDrawerPage;
pub use email_login::{EmailLoginPage, FailureCounter};
pub use login::LoginPage;
pub use main_home::MainHomePage;
pub use my_page::MyPage;
pub use playstore::PlayStorePage;
pub use search_results::SearchResultsPage;
pub use setting::SettingPage;
pub use splash::SplashPage;
