use showroom_assets::{AssetError, EnvironmentLoader, ModelLoader};
use showroom_scene::{EnvironmentTexture, Fragment};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Model,
    Environment,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Model => "model",
            AssetKind::Environment => "environment",
        })
    }
}

/// Identifies a load request and the mount it belongs to.
///
/// Outcomes whose generation no longer matches the stage are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub kind: AssetKind,
}

/// A load the host should run off the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum LoadResult {
    Model(Result<Fragment, AssetError>),
    Environment(Result<EnvironmentTexture, AssetError>),
}

/// Finished load, handed back to the stage on the UI thread.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: LoadResult,
}

/// The loader capabilities used to serve requests.
#[derive(Clone)]
pub struct Loaders {
    pub model: Arc<dyn ModelLoader>,
    pub environment: Arc<dyn EnvironmentLoader>,
}

impl Loaders {
    pub fn new(
        model: impl ModelLoader + 'static,
        environment: impl EnvironmentLoader + 'static,
    ) -> Self {
        Self {
            model: Arc::new(model),
            environment: Arc::new(environment),
        }
    }

    /// Run a request on the calling thread.
    pub fn load(&self, request: &LoadRequest) -> LoadOutcome {
        let result = match request.ticket.kind {
            AssetKind::Model => LoadResult::Model(self.model.load_model(&request.path)),
            AssetKind::Environment => {
                LoadResult::Environment(self.environment.load_environment(&request.path))
            }
        };
        LoadOutcome {
            ticket: request.ticket,
            result,
        }
    }
}

/// Run a request on a named worker thread and hand the outcome to `sink`.
///
/// The worker shares nothing with the stage; the sink decides how the
/// outcome reaches the UI thread (event loop proxy, channel).
pub fn dispatch_load(
    request: LoadRequest,
    loaders: Loaders,
    sink: impl FnOnce(LoadOutcome) + Send + 'static,
) -> std::io::Result<JoinHandle<()>> {
    let name = format!("load-{}", request.ticket.kind);
    std::thread::Builder::new().name(name).spawn(move || {
        tracing::debug!(kind = %request.ticket.kind, path = %request.path.display(), "load started");
        sink(loaders.load(&request));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_scene::NodeKind;
    use std::path::Path;
    use std::sync::mpsc;

    struct StubModel;
    impl ModelLoader for StubModel {
        fn load_model(&self, path: &Path) -> Result<Fragment, AssetError> {
            Ok(Fragment::group(path.display().to_string()).with_kind(NodeKind::Group))
        }
    }

    struct NoEnvironment;
    impl EnvironmentLoader for NoEnvironment {
        fn load_environment(&self, _path: &Path) -> Result<EnvironmentTexture, AssetError> {
            Err(AssetError::EmptyPath)
        }
    }

    fn request(kind: AssetKind, path: &str) -> LoadRequest {
        LoadRequest {
            ticket: LoadTicket {
                generation: 3,
                kind,
            },
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn load_routes_by_kind() {
        let loaders = Loaders::new(StubModel, NoEnvironment);
        let outcome = loaders.load(&request(AssetKind::Model, "a.gltf"));
        assert_eq!(outcome.ticket.generation, 3);
        match outcome.result {
            LoadResult::Model(Ok(fragment)) => assert_eq!(fragment.name, "a.gltf"),
            other => panic!("unexpected {other:?}"),
        }
        let outcome = loaders.load(&request(AssetKind::Environment, ""));
        assert!(matches!(
            outcome.result,
            LoadResult::Environment(Err(AssetError::EmptyPath))
        ));
    }

    #[test]
    fn dispatch_delivers_through_sink() {
        let loaders = Loaders::new(StubModel, NoEnvironment);
        let (tx, rx) = mpsc::channel();
        let handle = dispatch_load(request(AssetKind::Model, "m.gltf"), loaders, move |o| {
            let _ = tx.send(o);
        })
        .unwrap();
        handle.join().unwrap();
        let outcome = rx.recv().unwrap();
        assert_eq!(outcome.ticket.kind, AssetKind::Model);
    }
}
