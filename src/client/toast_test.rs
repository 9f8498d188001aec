use super::*;
use crate::client::test_helpers::{SurfaceEvent, recording_toasts};

async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[test]
fn error_toasts_linger_longer() {
    assert_eq!(Severity::Error.dismiss_after(), Duration::from_millis(8000));
    for severity in [Severity::Info, Severity::Success, Severity::Warning] {
        assert_eq!(severity.dismiss_after(), Duration::from_millis(5000));
    }
}

#[test]
fn severity_styles_are_distinct() {
    let all = [Severity::Info, Severity::Success, Severity::Warning, Severity::Error];
    let icons: std::collections::HashSet<_> = all.iter().map(|s| s.icon()).collect();
    let colors: std::collections::HashSet<_> = all.iter().map(|s| s.color_class()).collect();
    assert_eq!(icons.len(), 4);
    assert_eq!(colors.len(), 4);
    assert_eq!(Severity::Error.color_class(), "danger");
}

#[tokio::test(start_paused = true)]
async fn container_is_created_once() {
    let (toasts, surface) = recording_toasts();
    toasts.notify("one", Severity::Info);
    toasts.clone().notify("two", Severity::Success);

    let containers = surface.events().iter().filter(|e| **e == SurfaceEvent::Container).count();
    assert_eq!(containers, 1);
    assert_eq!(surface.events()[0], SurfaceEvent::Container);
    assert_eq!(toasts.visible(), 2);
}

/// Container creation that takes long enough for a second thread to race it.
#[derive(Default)]
struct SlowContainerSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl ToastSurface for SlowContainerSurface {
    fn create_container(&self) {
        std::thread::sleep(Duration::from_millis(100));
        self.events.lock().unwrap().push(SurfaceEvent::Container);
    }

    fn append(&self, toast: &Toast) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Append(toast.id, toast.message.clone(), toast.severity));
    }

    fn remove(&self, id: ToastId) {
        self.events.lock().unwrap().push(SurfaceEvent::Remove(id));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_first_toasts_wait_for_container() {
    let surface = Arc::new(SlowContainerSurface::default());
    let toasts = ToastNotifier::new(surface.clone());

    let first = tokio::spawn({
        let toasts = toasts.clone();
        async move { toasts.notify("one", Severity::Info) }
    });
    let second = tokio::spawn({
        let toasts = toasts.clone();
        async move { toasts.notify("two", Severity::Info) }
    });
    first.await.unwrap();
    second.await.unwrap();

    let events = surface.events.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], SurfaceEvent::Container);
    assert_eq!(events.iter().filter(|e| **e == SurfaceEvent::Container).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn info_toast_removed_after_five_seconds() {
    let (toasts, surface) = recording_toasts();
    let id = toasts.notify("saved", Severity::Info);

    advance_ms(4999).await;
    assert!(!surface.events().contains(&SurfaceEvent::Remove(id)));
    assert_eq!(toasts.visible(), 1);

    advance_ms(2).await;
    assert!(surface.events().contains(&SurfaceEvent::Remove(id)));
    assert_eq!(toasts.visible(), 0);
}

#[tokio::test(start_paused = true)]
async fn error_toast_removed_after_eight_seconds() {
    let (toasts, surface) = recording_toasts();
    let id = toasts.notify("failed", Severity::Error);

    advance_ms(7999).await;
    assert!(!surface.events().contains(&SurfaceEvent::Remove(id)));

    advance_ms(2).await;
    assert!(surface.events().contains(&SurfaceEvent::Remove(id)));
}

#[tokio::test(start_paused = true)]
async fn dismiss_removes_immediately_and_only_once() {
    let (toasts, surface) = recording_toasts();
    let id = toasts.notify("bye", Severity::Warning);

    assert!(toasts.dismiss(id));
    assert!(!toasts.dismiss(id));

    advance_ms(6000).await;
    let removals = surface.events().iter().filter(|e| **e == SurfaceEvent::Remove(id)).count();
    assert_eq!(removals, 1);
}

#[tokio::test(start_paused = true)]
async fn mixed_toasts_expire_independently() {
    let (toasts, surface) = recording_toasts();
    let info = toasts.notify("info", Severity::Info);
    let error = toasts.notify("error", Severity::Error);

    advance_ms(5001).await;
    let events = surface.events();
    assert!(events.contains(&SurfaceEvent::Remove(info)));
    assert!(!events.contains(&SurfaceEvent::Remove(error)));

    advance_ms(3000).await;
    assert!(surface.events().contains(&SurfaceEvent::Remove(error)));
    assert_eq!(surface.messages().len(), 2);
}
