use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;

use super::{App, AppMsg};
use crate::display::DisplayController;
use crate::notify::{DEFAULT_EXPIRY, SHORT_EXPIRY};
use crate::tool::CommandRunner;

impl<R: CommandRunner + 'static> App<R> {
    /// Dispatch one message. Controller actions run as their own tasks so the
    /// loop keeps polling while the tool is busy.
    pub fn update(&mut self, message: AppMsg) -> ControlFlow<()> {
        debug!("{:?}", message);

        match message {
            AppMsg::FixExternal => {
                let progress = self.notifier.clone();
                self.perform(move |controller| async move {
                    controller
                        .fix_external_display(move |message| {
                            tokio::spawn(async move {
                                progress.show(&message, SHORT_EXPIRY).await;
                            });
                        })
                        .await
                });
            }
            AppMsg::SetLayout(layout) => {
                self.perform(move |controller| async move { controller.set_layout(layout).await });
            }
            AppMsg::SetScale(output, factor) => {
                self.perform(move |controller| async move {
                    controller.set_scale(output, &factor).await
                });
            }
            AppMsg::EnableExternal => {
                self.perform(|controller| async move { controller.enable_external().await });
            }
            AppMsg::DisableExternal => {
                self.perform(|controller| async move { controller.disable_external().await });
            }
            AppMsg::HotplugDetected => self.refresh_status(),
            AppMsg::Quit => {
                info!("quit requested");
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    /// Spawn `action` and show the message it returns
    fn perform<F, Fut>(&self, action: F)
    where
        F: FnOnce(Arc<DisplayController<R>>) -> Fut,
        Fut: Future<Output = String> + Send + 'static,
    {
        let notifier = self.notifier.clone();
        let task = action(self.controller.clone());

        tokio::spawn(async move {
            let message = task.await;
            notifier.show(&message, DEFAULT_EXPIRY).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::config::Config;
    use crate::display::{Layout, Output};
    use crate::notify::Notifier;
    use crate::status::StatusReader;

    #[derive(Clone, Default)]
    struct RecordingRunner {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl CommandRunner for RecordingRunner {
        async fn run(&self, args: &[String]) -> bool {
            self.calls.lock().unwrap().push(args.join(" "));
            true
        }
    }

    fn app(runner: RecordingRunner, status: StatusReader) -> App<RecordingRunner> {
        let config = Config::default();
        App::new(
            DisplayController::new(runner, &config),
            Notifier::log_only(),
            status,
            None,
            config.poll_interval(),
        )
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_actions_reach_the_tool() {
        let runner = RecordingRunner::default();
        let mut app = app(runner.clone(), StatusReader::new("/nonexistent/status"));

        assert!(app.update(AppMsg::SetLayout(Layout::Right)).is_continue());
        settle().await;
        assert!(
            app.update(AppMsg::SetScale(Output::External, "1.5".parse().unwrap()))
                .is_continue()
        );
        settle().await;
        assert!(app.update(AppMsg::EnableExternal).is_continue());
        settle().await;

        assert_eq!(
            *runner.calls.lock().unwrap(),
            [
                "output.HDMI-A-1.position.1920,0",
                "output.HDMI-A-1.scale.1.5",
                "output.HDMI-A-1.enable",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fix_runs_in_background() {
        let runner = RecordingRunner::default();
        let mut app = app(runner.clone(), StatusReader::new("/nonexistent/status"));

        assert!(app.update(AppMsg::FixExternal).is_continue());
        settle().await;
        assert_eq!(runner.calls.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        settle().await;
        assert_eq!(runner.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_fix_message_runs_one_fix() {
        let runner = RecordingRunner::default();
        let mut app = app(runner.clone(), StatusReader::new("/nonexistent/status"));

        assert!(app.update(AppMsg::FixExternal).is_continue());
        settle().await;
        assert!(app.update(AppMsg::FixExternal).is_continue());
        settle().await;
        assert_eq!(runner.calls.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        settle().await;
        assert_eq!(runner.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_hotplug_refreshes_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        std::fs::write(&path, "connected\n").unwrap();
        let mut app = app(RecordingRunner::default(), StatusReader::new(&path));

        assert_eq!(app.status.last(), None);
        assert!(app.update(AppMsg::HotplugDetected).is_continue());
        assert_eq!(app.status.last(), Some(true));
    }

    #[tokio::test]
    async fn test_quit_stops_the_loop() {
        let mut app = app(RecordingRunner::default(), StatusReader::new("/nonexistent/status"));
        assert!(app.update(AppMsg::Quit).is_break());
    }

    #[tokio::test]
    async fn test_run_polls_then_stops_on_quit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        std::fs::write(&path, "disconnected\n").unwrap();
        let app = app(RecordingRunner::default(), StatusReader::new(&path));

        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        sender.send(AppMsg::Quit).unwrap();
        tokio::time::timeout(Duration::from_secs(5), app.run(receiver))
            .await
            .unwrap();
    }
}
