// ABOUTME: Scripted Orchestrator for end-to-end verifier tests.
// ABOUTME: Records calls, fails on demand, and can bring up stub services on `up`.

use super::stubs::{self, HttpReply, Stub};
use async_trait::async_trait;
use deploy_verify::compose::{ContainerSummary, ImageSummary, Manifest, Orchestrator};
use deploy_verify::process::CommandError;
use std::sync::Mutex;

pub const NGINX_INSPECT: &str = r#"[
  {
    "Id": "sha256:a8758716bb6aa4d90071160d27028fe4eaee7ce8166221a97d30440c8eac2be6",
    "RepoTags": ["nginx:latest"],
    "Created": "2024-02-14T18:50:31.108307813Z",
    "Os": "linux",
    "Config": {
      "ExposedPorts": {"80/tcp": {}},
      "Cmd": ["nginx", "-g", "daemon off;"]
    }
  }
]"#;

/// A service the fake brings up when `up` runs.
#[derive(Debug, Clone)]
pub enum StubService {
    Http { port: u16, replies: Vec<HttpReply> },
    Tcp { port: u16 },
}

pub struct FakeOrchestrator {
    pub calls: Mutex<Vec<String>>,
    pub running: Mutex<Vec<Stub>>,
    pub fail_build: bool,
    pub fail_up: bool,
    pub fail_listing: bool,
    pub images: Vec<ImageSummary>,
    pub containers: Vec<ContainerSummary>,
    /// `None` makes `inspect_image` fail.
    pub inspect: Option<String>,
    pub services: Vec<StubService>,
}

impl Default for FakeOrchestrator {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            running: Mutex::new(Vec::new()),
            fail_build: false,
            fail_up: false,
            fail_listing: false,
            images: vec![ImageSummary {
                repository: "nginx".to_string(),
                tag: "latest".to_string(),
                id: "a8758716bb6a".to_string(),
                size: "187MB".to_string(),
            }],
            containers: vec![proxy_container("nginx:latest")],
            inspect: Some(NGINX_INSPECT.to_string()),
            services: Vec::new(),
        }
    }
}

pub fn proxy_container(image: &str) -> ContainerSummary {
    ContainerSummary {
        id: "f00dfeed".to_string(),
        image: image.to_string(),
        names: "bank-proxy-1".to_string(),
        status: "Up 3 seconds".to_string(),
        ports: "0.0.0.0:80->80/tcp".to_string(),
    }
}

fn failure(command: &str, stderr: &str) -> CommandError {
    CommandError::Failed {
        command: command.to_string(),
        exit_code: Some(1),
        stderr: stderr.to_string(),
    }
}

impl FakeOrchestrator {
    pub fn with_services(services: Vec<StubService>) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl Orchestrator for FakeOrchestrator {
    async fn build(&self, _manifest: &Manifest) -> Result<(), CommandError> {
        self.record("build");
        if self.fail_build {
            return Err(failure("docker-compose build", "failed to solve: backend"));
        }
        Ok(())
    }

    async fn up(&self, _manifest: &Manifest) -> Result<(), CommandError> {
        self.record("up");
        if self.fail_up {
            return Err(failure("docker-compose up -d", "network bank_default not found"));
        }

        let mut started = Vec::new();
        for service in &self.services {
            let stub = match service {
                StubService::Http { port, replies } => {
                    stubs::http_on(stubs::bind(*port).await, replies.clone())
                }
                StubService::Tcp { port } => stubs::tcp_on(stubs::bind(*port).await),
            };
            started.push(stub);
        }
        self.running.lock().unwrap().extend(started);
        Ok(())
    }

    async fn images(&self) -> Result<Vec<ImageSummary>, CommandError> {
        self.record("images");
        if self.fail_listing {
            return Err(failure("docker images", "Cannot connect to the Docker daemon"));
        }
        Ok(self.images.clone())
    }

    async fn containers(&self) -> Result<Vec<ContainerSummary>, CommandError> {
        self.record("containers");
        if self.fail_listing {
            return Err(failure("docker ps", "Cannot connect to the Docker daemon"));
        }
        Ok(self.containers.clone())
    }

    async fn inspect_image(&self, image: &str) -> Result<String, CommandError> {
        self.record(&format!("inspect {image}"));
        self.inspect
            .clone()
            .ok_or_else(|| failure("docker image inspect", "No such image"))
    }
}
