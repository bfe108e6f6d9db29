// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use http::Method;

use serde::Deserialize;
use serde::Serialize;

use tokio::time::sleep;
use tokio::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::auth::responder::Channel;
use crate::endpoint::Body;
use crate::endpoint::ConversionError;
use crate::Client;
use crate::Error;
use crate::Str;


/// The timing of the device verification workflow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WorkflowConfig {
  /// The time the entire workflow may take.
  pub timeout: Duration,
  /// The interval at which the workflow's state is polled.
  pub poll_interval: Duration,
  /// The number of failed or inconclusive approval checks tolerated.
  pub max_retries: usize,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(120),
      poll_interval: Duration::from_secs(5),
      max_retries: 5,
    }
  }
}


/// The input for creating a workflow "machine".
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MachineReq {
  #[serde(rename = "device_id")]
  device_id: String,
  #[serde(rename = "flow")]
  flow: &'static str,
  #[serde(rename = "input")]
  input: MachineInput,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
struct MachineInput {
  #[serde(rename = "workflow_id")]
  workflow_id: String,
}

impl MachineReq {
  /// Create a request for verifying the given device as part of the
  /// given workflow.
  pub fn new(device_id: impl ToString, workflow_id: impl ToString) -> Self {
    Self {
      device_id: device_id.to_string(),
      flow: "suv",
      input: MachineInput {
        workflow_id: workflow_id.to_string(),
      },
    }
  }
}


/// A workflow machine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Machine {
  /// The machine's ID.
  #[serde(rename = "id")]
  pub id: String,
}


Endpoint! {
  /// The representation of a POST request to the
  /// /pathfinder/user_machine/ endpoint.
  pub CreateMachine(MachineReq),
  Ok => Machine, [
    /// The machine was created.
    /* 200 */ OK,
    /// The machine was created.
    /* 201 */ CREATED,
  ],
  Err => CreateMachineError, []

  fn method() -> Method {
    Method::POST
  }

  fn path(_input: &Self::Input) -> Str {
    "/pathfinder/user_machine/".into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::json(input)?))
  }

  fn authenticated() -> bool {
    false
  }
}


/// The type of a verification challenge.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum ChallengeType {
  /// The login has to be approved in the mobile app.
  #[serde(rename = "prompt")]
  Prompt,
  /// A code was sent via text message.
  #[serde(rename = "sms")]
  Sms,
  /// A code was sent via email.
  #[serde(rename = "email")]
  Email,
  /// Any other challenge type.
  #[serde(other)]
  Unknown,
}


/// The status of a verification challenge.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum ChallengeStatus {
  /// The challenge was issued and awaits a response.
  #[serde(rename = "issued")]
  Issued,
  /// The challenge was passed.
  #[serde(rename = "validated")]
  Validated,
  /// The challenge failed.
  #[serde(rename = "failed")]
  Failed,
  /// Any other status.
  #[serde(other)]
  Unknown,
}


/// A verification ("sheriff") challenge.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Challenge {
  /// The challenge's ID.
  #[serde(rename = "id")]
  pub id: String,
  /// The type of challenge.
  #[serde(rename = "type")]
  pub type_: ChallengeType,
  /// The challenge's status.
  #[serde(rename = "status")]
  pub status: ChallengeStatus,
}


#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
struct Context {
  #[serde(rename = "sheriff_challenge", default)]
  sheriff_challenge: Option<Challenge>,
}


/// The user's view of a workflow machine.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct UserView {
  #[serde(rename = "context", default)]
  context: Option<Context>,
}

impl UserView {
  /// Retrieve the challenge currently presented, if any.
  pub fn challenge(&self) -> Option<&Challenge> {
    self.context.as_ref()?.sheriff_challenge.as_ref()
  }
}


Endpoint! {
  /// The representation of a GET request to the
  /// /pathfinder/inquiries/<machine>/user_view/ endpoint.
  pub GetUserView(String),
  Ok => UserView, [
    /// The user view was retrieved.
    /* 200 */ OK,
  ],
  Err => GetUserViewError, [
    /// The machine was not found.
    /* 404 */ NOT_FOUND => NotFound,
  ]

  fn path(input: &Self::Input) -> Str {
    format!("/pathfinder/inquiries/{input}/user_view/").into()
  }

  fn authenticated() -> bool {
    false
  }
}


/// The status of a challenge to be approved in the mobile app.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct PromptStatus {
  /// The challenge's status.
  #[serde(rename = "challenge_status")]
  pub challenge_status: ChallengeStatus,
}


Endpoint! {
  /// The representation of a GET request to the
  /// /push/<challenge>/get_prompts_status/ endpoint.
  pub GetPromptStatus(String),
  Ok => PromptStatus, [
    /// The status was retrieved.
    /* 200 */ OK,
  ],
  Err => GetPromptStatusError, []

  fn path(input: &Self::Input) -> Str {
    format!("/push/{input}/get_prompts_status/").into()
  }

  fn authenticated() -> bool {
    false
  }
}


/// A response to a code based challenge.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RespondReq {
  /// The code received.
  #[serde(rename = "response")]
  pub response: String,
}


/// The reply to a challenge response.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct ChallengeReply {
  /// The challenge's status after the response.
  #[serde(rename = "status")]
  pub status: ChallengeStatus,
}


Endpoint! {
  /// The representation of a POST request to the
  /// /challenge/<challenge>/respond/ endpoint.
  pub RespondChallenge((String, RespondReq)),
  Ok => ChallengeReply, [
    /// The response was accepted.
    /* 200 */ OK,
  ],
  Err => RespondChallengeError, [
    /// The code was not correct.
    /* 400 */ BAD_REQUEST => InvalidCode,
  ]

  fn method() -> Method {
    Method::POST
  }

  fn path(input: &Self::Input) -> Str {
    format!("/challenge/{}/respond/", input.0).into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::form(&input.1)?))
  }

  fn authenticated() -> bool {
    false
  }

  fn sensitive() -> bool {
    true
  }
}


/// The status of a workflow.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum WorkflowStatus {
  /// The workflow was approved.
  #[serde(rename = "workflow_status_approved")]
  Approved,
  /// Approval is still being processed.
  #[serde(rename = "workflow_status_internal_pending")]
  InternalPending,
  /// Any other status.
  #[serde(other)]
  Unknown,
}


/// The request to advance a workflow.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContinueReq {
  #[serde(rename = "sequence")]
  sequence: u64,
  #[serde(rename = "user_input")]
  user_input: UserInput,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
struct UserInput {
  #[serde(rename = "status")]
  status: &'static str,
}

impl Default for ContinueReq {
  fn default() -> Self {
    Self {
      sequence: 0,
      user_input: UserInput { status: "continue" },
    }
  }
}


#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
struct TypeContext {
  #[serde(rename = "result", default)]
  result: Option<WorkflowStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
struct WorkflowState {
  #[serde(rename = "workflow_status", default)]
  workflow_status: Option<WorkflowStatus>,
}


/// The state of a workflow as reported when advancing it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct WorkflowView {
  #[serde(rename = "type_context", default)]
  type_context: Option<TypeContext>,
  #[serde(rename = "verification_workflow", default)]
  verification_workflow: Option<WorkflowState>,
}

impl WorkflowView {
  /// Retrieve the workflow's status.
  pub fn status(&self) -> Option<WorkflowStatus> {
    self.verification_workflow.as_ref()?.workflow_status
  }

  /// Check whether the workflow was approved.
  pub fn is_approved(&self) -> bool {
    let result = self.type_context.as_ref().and_then(|context| context.result);
    result == Some(WorkflowStatus::Approved) || self.status() == Some(WorkflowStatus::Approved)
  }
}


Endpoint! {
  /// The representation of a POST request to the
  /// /pathfinder/inquiries/<machine>/user_view/ endpoint.
  pub Continue((String, ContinueReq)),
  Ok => WorkflowView, [
    /// The workflow state was retrieved.
    /* 200 */ OK,
  ],
  Err => ContinueError, []

  fn method() -> Method {
    Method::POST
  }

  fn path(input: &Self::Input) -> Str {
    format!("/pathfinder/inquiries/{}/user_view/", input.0).into()
  }

  fn body(input: &Self::Input) -> Result<Option<Body>, ConversionError> {
    Ok(Some(Body::json(&input.1)?))
  }

  fn authenticated() -> bool {
    false
  }
}


/// Run through the device verification workflow with the given ID.
///
/// The workflow is completed in two phases: first a challenge (app
/// approval or a code sent via SMS or email) has to be passed, then
/// the workflow's approval is awaited.
#[instrument(level = "debug", skip(client, device_token))]
pub async fn verify(client: &Client, device_token: &str, workflow_id: &str) -> Result<(), Error> {
  let config = *client.workflow_config();
  let request = MachineReq::new(device_token, workflow_id);
  let machine = client.issue::<CreateMachine>(&request).await?;
  debug!(machine = %machine.id, "created workflow machine");

  let deadline = Instant::now() + config.timeout;
  let () = await_challenge(client, &config, &machine.id, deadline).await?;
  await_approval(client, &config, &machine.id, deadline).await
}

/// Wait for the verification challenge to be passed.
async fn await_challenge(
  client: &Client,
  config: &WorkflowConfig,
  machine: &str,
  deadline: Instant,
) -> Result<(), Error> {
  let machine = machine.to_string();

  while Instant::now() < deadline {
    sleep(config.poll_interval).await;

    let view = match client.issue::<GetUserView>(&machine).await {
      Ok(view) => view,
      Err(err) => {
        warn!("failed to retrieve verification challenge: {}; retrying", Error::from(err));
        continue
      },
    };

    let challenge = match view.challenge() {
      Some(challenge) => challenge,
      None => continue,
    };

    match (challenge.type_, challenge.status) {
      (ChallengeType::Prompt, _) => {
        info!("waiting for login approval in the Robinhood app");
        return await_prompt(client, config, &challenge.id, deadline).await
      },
      (_, ChallengeStatus::Validated) => {
        info!("verification challenge passed");
        return Ok(())
      },
      (type_ @ (ChallengeType::Sms | ChallengeType::Email), ChallengeStatus::Issued) => {
        let channel = if type_ == ChallengeType::Sms {
          Channel::Sms
        } else {
          Channel::Email
        };
        let code = client.responder().respond(channel).await?;
        let request = (challenge.id.clone(), RespondReq { response: code });
        match client.issue::<RespondChallenge>(&request).await {
          Ok(reply) if reply.status == ChallengeStatus::Validated => {
            info!("verification challenge passed");
            return Ok(())
          },
          Ok(reply) => debug!(status = ?reply.status, "challenge not yet passed"),
          Err(err) => warn!("verification code was not accepted: {}", Error::from(err)),
        }
      },
      (type_, status) => debug!(type_ = ?type_, status = ?status, "ignoring challenge"),
    }
  }
  Ok(())
}

/// Wait for a challenge to be approved in the mobile app.
async fn await_prompt(
  client: &Client,
  config: &WorkflowConfig,
  challenge: &str,
  deadline: Instant,
) -> Result<(), Error> {
  let challenge = challenge.to_string();

  while Instant::now() < deadline {
    sleep(config.poll_interval).await;

    match client.issue::<GetPromptStatus>(&challenge).await {
      Ok(status) if status.challenge_status == ChallengeStatus::Validated => {
        info!("login approved in the Robinhood app");
        return Ok(())
      },
      Ok(status) => debug!(status = ?status.challenge_status, "login not yet approved"),
      Err(err) => warn!("failed to retrieve approval status: {}", Error::from(err)),
    }
  }

  Err(Error::Workflow(
    "timeout reached while waiting for approval in the app".into(),
  ))
}

fn retries_exhausted() -> Error {
  Error::Workflow("max retries reached while checking workflow status".into())
}

/// Wait for the workflow to be approved.
async fn await_approval(
  client: &Client,
  config: &WorkflowConfig,
  machine: &str,
  deadline: Instant,
) -> Result<(), Error> {
  let request = (machine.to_string(), ContinueReq::default());
  let mut retries = config.max_retries;

  while Instant::now() < deadline {
    match client.issue::<Continue>(&request).await {
      Ok(view) if view.is_approved() => {
        info!("device verification approved");
        return Ok(())
      },
      Ok(view) if view.status() == Some(WorkflowStatus::InternalPending) => {
        debug!("waiting for approval to be finalized");
      },
      Ok(view) => {
        debug!(status = ?view.status(), "workflow not approved");
        retries = retries.saturating_sub(1);
        if retries == 0 {
          return Err(retries_exhausted())
        }
      },
      Err(err) => {
        warn!("failed to check workflow status: {}", Error::from(err));
        retries = retries.saturating_sub(1);
        if retries == 0 {
          return Err(retries_exhausted())
        }
      },
    }
    sleep(config.poll_interval).await;
  }

  Err(Error::Workflow(
    "timeout reached while waiting for workflow approval".into(),
  ))
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::io;
  use std::io::Write;
  use std::sync::Arc;
  use std::sync::Mutex as StdMutex;

  use mockito::Matcher;
  use mockito::Server;

  use serde_json::from_str as from_json;
  use serde_json::json;

  use test_log::test;

  use tracing::Level;

  use crate::test_util::test_api_info;
  use crate::test_util::test_client;
  use crate::test_util::FixedResponder;
  use crate::test_util::FAST_WORKFLOW;


  async fn create_machine(server: &mut Server) -> mockito::Mock {
    server
      .mock("POST", "/pathfinder/user_machine/")
      .match_header("content-type", "application/json")
      .match_body(Matcher::Json(json!({
        "device_id": "device",
        "flow": "suv",
        "input": {"workflow_id": "workflow"},
      })))
      .with_status(200)
      .with_body(r#"{"id": "machine"}"#)
      .create_async()
      .await
  }

  async fn user_view(server: &mut Server, body: &str) -> mockito::Mock {
    server
      .mock("GET", "/pathfinder/inquiries/machine/user_view/")
      .with_status(200)
      .with_body(body)
      .create_async()
      .await
  }

  async fn workflow_status(server: &mut Server, body: &str) -> mockito::Mock {
    server
      .mock("POST", "/pathfinder/inquiries/machine/user_view/")
      .match_body(Matcher::Json(json!({
        "sequence": 0,
        "user_input": {"status": "continue"},
      })))
      .with_status(200)
      .with_body(body)
      .create_async()
      .await
  }


  /// Check that we can parse a user view with a challenge.
  #[test]
  fn parse_user_view() {
    let response = r#"{
      "context": {
        "sheriff_challenge": {
          "id": "f0ba28a8-d5fd-4a4e-a1a8-2c1cfc5d2a03",
          "type": "sms",
          "status": "issued",
          "remaining_attempts": 3
        }
      },
      "sequence": 0
    }"#;
    let view = from_json::<UserView>(response).unwrap();
    let challenge = view.challenge().unwrap();
    assert_eq!(challenge.type_, ChallengeType::Sms);
    assert_eq!(challenge.status, ChallengeStatus::Issued);

    let view = from_json::<UserView>(r#"{"context": {}}"#).unwrap();
    assert_eq!(view.challenge(), None);

    let response = r#"{"context": {"sheriff_challenge": {"id": "a", "type": "carrier_pigeon", "status": "pondering"}}}"#;
    let view = from_json::<UserView>(response).unwrap();
    let challenge = view.challenge().unwrap();
    assert_eq!(challenge.type_, ChallengeType::Unknown);
    assert_eq!(challenge.status, ChallengeStatus::Unknown);
  }

  /// Check that we interpret workflow status reports correctly.
  #[test]
  fn parse_workflow_view() {
    let view = from_json::<WorkflowView>(r#"{"type_context": {"result": "workflow_status_approved"}}"#).unwrap();
    assert!(view.is_approved());

    let view = from_json::<WorkflowView>(
      r#"{"verification_workflow": {"id": "x", "workflow_status": "workflow_status_approved"}}"#,
    )
    .unwrap();
    assert!(view.is_approved());

    let view = from_json::<WorkflowView>(
      r#"{"type_context": {"result": null}, "verification_workflow": {"workflow_status": "workflow_status_internal_pending"}}"#,
    )
    .unwrap();
    assert!(!view.is_approved());
    assert_eq!(view.status(), Some(WorkflowStatus::InternalPending));

    let view = from_json::<WorkflowView>(r#"{"verification_workflow": {"workflow_status": "workflow_status_denied"}}"#).unwrap();
    assert!(!view.is_approved());
    assert_eq!(view.status(), Some(WorkflowStatus::Unknown));
  }

  /// Check that we answer an SMS challenge with a code from the
  /// responder.
  #[test(tokio::test)]
  async fn verify_sms_challenge() {
    let mut server = Server::new_async().await;
    let machine = create_machine(&mut server).await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "sms", "status": "issued"}}}"#,
    )
    .await;
    let respond = server
      .mock("POST", "/challenge/challenge/respond/")
      .match_body("response=123456")
      .with_status(200)
      .with_body(r#"{"id": "challenge", "status": "validated"}"#)
      .create_async()
      .await;
    let status = workflow_status(
      &mut server,
      r#"{"type_context": {"result": "workflow_status_approved"}}"#,
    )
    .await;

    let client = Client::builder()
      .workflow(FAST_WORKFLOW)
      .responder(FixedResponder("123456"))
      .build(test_api_info(&server.url()));
    let () = verify(&client, "device", "workflow").await.unwrap();

    machine.assert_async().await;
    respond.assert_async().await;
    status.assert_async().await;
  }

  /// Check that we wait for approval in the app.
  #[test(tokio::test)]
  async fn verify_prompt_challenge() {
    let mut server = Server::new_async().await;
    let _machine = create_machine(&mut server).await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "prompt", "status": "issued"}}}"#,
    )
    .await;
    // The first poll reports the challenge as pending, the second one
    // as validated.
    let pending = server
      .mock("GET", "/push/challenge/get_prompts_status/")
      .with_status(200)
      .with_body(r#"{"challenge_status": "issued"}"#)
      .expect(1)
      .create_async()
      .await;
    let validated = server
      .mock("GET", "/push/challenge/get_prompts_status/")
      .with_status(200)
      .with_body(r#"{"challenge_status": "validated"}"#)
      .expect(1)
      .create_async()
      .await;
    let _status = workflow_status(
      &mut server,
      r#"{"verification_workflow": {"workflow_status": "workflow_status_approved"}}"#,
    )
    .await;

    let client = test_client(&server.url());
    let () = verify(&client, "device", "workflow").await.unwrap();

    pending.assert_async().await;
    validated.assert_async().await;
  }

  /// Check that an already validated challenge moves on to the approval
  /// phase, which waits while approval is pending.
  #[test(tokio::test)]
  async fn verify_pending_approval() {
    let mut server = Server::new_async().await;
    let _machine = create_machine(&mut server).await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "email", "status": "validated"}}}"#,
    )
    .await;
    let pending = server
      .mock("POST", "/pathfinder/inquiries/machine/user_view/")
      .with_status(200)
      .with_body(r#"{"verification_workflow": {"workflow_status": "workflow_status_internal_pending"}}"#)
      .expect(2)
      .create_async()
      .await;
    let approved = workflow_status(
      &mut server,
      r#"{"type_context": {"result": "workflow_status_approved"}}"#,
    )
    .await;

    let client = test_client(&server.url());
    let () = verify(&client, "device", "workflow").await.unwrap();

    pending.assert_async().await;
    approved.assert_async().await;
  }

  /// Check that pending replies do not count against the retry
  /// budget.
  #[test(tokio::test)]
  async fn verify_pending_without_retries() {
    let mut server = Server::new_async().await;
    let _machine = create_machine(&mut server).await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "sms", "status": "validated"}}}"#,
    )
    .await;
    let pending = server
      .mock("POST", "/pathfinder/inquiries/machine/user_view/")
      .with_status(200)
      .with_body(r#"{"verification_workflow": {"workflow_status": "workflow_status_internal_pending"}}"#)
      .expect(2)
      .create_async()
      .await;
    let approved = workflow_status(
      &mut server,
      r#"{"verification_workflow": {"workflow_status": "workflow_status_approved"}}"#,
    )
    .await;

    let config = WorkflowConfig {
      max_retries: 0,
      ..FAST_WORKFLOW
    };
    let client = Client::builder()
      .workflow(config)
      .responder(FixedResponder("000000"))
      .build(test_api_info(&server.url()));
    let () = verify(&client, "device", "workflow").await.unwrap();

    pending.assert_async().await;
    approved.assert_async().await;
  }

  /// Check that status replies are plain values.
  #[test]
  fn copy_status_replies() {
    let status = from_json::<PromptStatus>(r#"{"challenge_status": "validated"}"#).unwrap();
    let copy = status;
    assert_eq!(copy, status);

    let reply = from_json::<ChallengeReply>(r#"{"id": "challenge", "status": "issued"}"#).unwrap();
    let copy = reply;
    assert_eq!(copy.status, reply.status);
    assert_eq!(reply.status, ChallengeStatus::Issued);
  }

  /// Check that the device token does not end up in traces.
  #[tokio::test]
  async fn verify_does_not_trace_device_token() {
    #[derive(Clone, Default)]
    struct Buffer(Arc<StdMutex<Vec<u8>>>);

    impl Write for Buffer {
      fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
      }

      fn flush(&mut self) -> io::Result<()> {
        Ok(())
      }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(Level::DEBUG)
      .with_writer(move || writer.clone())
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut server = Server::new_async().await;
    let _machine = server
      .mock("POST", "/pathfinder/user_machine/")
      .with_status(200)
      .with_body(r#"{"id": "machine"}"#)
      .create_async()
      .await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "sms", "status": "validated"}}}"#,
    )
    .await;
    let _approved = workflow_status(
      &mut server,
      r#"{"type_context": {"result": "workflow_status_approved"}}"#,
    )
    .await;

    let client = test_client(&server.url());
    let () = verify(&client, "3c6cd4f8-secret-device", "workflow")
      .await
      .unwrap();

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("workflow_id"), "{output}");
    assert!(!output.contains("3c6cd4f8"), "{output}");
  }

  /// Check that the workflow fails once retries are exhausted.
  #[test(tokio::test)]
  async fn verify_retries_exhausted() {
    let mut server = Server::new_async().await;
    let _machine = create_machine(&mut server).await;
    let _view = user_view(
      &mut server,
      r#"{"context": {"sheriff_challenge": {"id": "challenge", "type": "sms", "status": "validated"}}}"#,
    )
    .await;
    let failing = server
      .mock("POST", "/pathfinder/inquiries/machine/user_view/")
      .with_status(500)
      .with_body("Internal Server Error")
      .expect(FAST_WORKFLOW.max_retries)
      .create_async()
      .await;

    let client = test_client(&server.url());
    let err = verify(&client, "device", "workflow").await.unwrap_err();
    assert!(matches!(err, Error::Workflow(..)), "{err:?}");
    assert!(err.to_string().contains("max retries"), "{err}");
    failing.assert_async().await;
  }

  /// Check that the workflow fails when approval does not happen in
  /// time.
  #[test(tokio::test)]
  async fn verify_timeout() {
    let mut server = Server::new_async().await;
    let _machine = create_machine(&mut server).await;
    let _view = user_view(&mut server, r#"{"context": {}}"#).await;

    let config = WorkflowConfig {
      timeout: Duration::from_millis(100),
      poll_interval: Duration::from_millis(10),
      max_retries: 5,
    };
    let client = Client::builder()
      .workflow(config)
      .build(test_api_info(&server.url()));
    let err = verify(&client, "device", "workflow").await.unwrap_err();
    assert!(matches!(err, Error::Workflow(..)), "{err:?}");
    assert!(err.to_string().contains("timeout"), "{err}");
  }

  /// Check that machine creation failures are reported.
  #[test(tokio::test)]
  async fn verify_machine_failure() {
    let mut server = Server::new_async().await;
    let _machine = server
      .mock("POST", "/pathfinder/user_machine/")
      .with_status(400)
      .with_body(r#"{"detail": "Invalid workflow."}"#)
      .create_async()
      .await;

    let client = test_client(&server.url());
    let err = verify(&client, "device", "workflow").await.unwrap_err();
    match err {
      Error::HttpStatus(status, message) => {
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid workflow.");
      },
      _ => panic!("Received unexpected error: {err:?}"),
    }
  }
}
