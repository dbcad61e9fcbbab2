use rocket::fairing::Fairing;
use zkpay::fairings::{Cors, PanicCatcher, RequestLogger};

#[test]
fn test_fairing_names() {
    assert_eq!(RequestLogger.info().name, "Request/Response Logger");
    assert_eq!(PanicCatcher.info().name, "Panic Catcher");
    assert_eq!(Cors.info().name, "CORS");
}

#[test]
fn test_fairing_trait_implementation() {
    fn check_fairing<T: Fairing>(_fairing: T) {}

    check_fairing(RequestLogger);
    check_fairing(PanicCatcher);
    check_fairing(Cors);
}
