#[macro_use]
extern crate error_chain;

pub mod apis;
pub mod clients;
pub mod controller;
pub mod diff;
pub mod events;
pub mod managed;
pub mod manager;

pub mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {
        foreign_links {
            Io(std::io::Error);
            HttpRequest(reqwest::Error);
            Kube(kube::Error);
            Json(serde_json::Error);
            Yaml(serde_yaml::Error);
        }

        errors {
            Configuration(msg: String) {
                description("cannot resolve provider configuration")
                display("cannot resolve provider configuration: {}", msg)
            }
            Api(status: u16, body: String) {
                description("ZPA API request failed")
                display("ZPA API request failed with status {}: {}", status, body)
            }
            Cancelled {
                description("request cancelled")
                display("request cancelled")
            }
            MissingExternalName(kind: &'static str) {
                description("managed resource has no external name")
                display("{} has no external name", kind)
            }
            MissingObjectKey(key: &'static str) {
                description("object is missing a required key")
                display("object is missing {}", key)
            }
            CreateFailed(kind: &'static str) {
                description("cannot create external resource")
                display("cannot create {}", kind)
            }
            DescribeFailed(kind: &'static str) {
                description("cannot describe external resource")
                display("cannot describe {}", kind)
            }
            UpdateFailed(kind: &'static str) {
                description("cannot update external resource")
                display("cannot update {}", kind)
            }
            DeleteFailed(kind: &'static str) {
                description("cannot delete external resource")
                display("cannot delete {}", kind)
            }
        }
    }
}

/*
Every managed kind follows the same four verbs against ZPA:

- Observe
  - no external name: nothing to read yet, report absent so Create runs.
  - GET by id. A 404 means the object is gone and will be recreated.
  - overwrite status.atProvider, late-init unset spec fields, diff the rest.

- Create / Update
  - the API wants the complete object every time, never a patch.
  - Create is the only place an external name is ever assigned.

- Delete
  - without an external name there is nothing to address, that's a bug upstream.
  - a 404 here is surfaced like any other failure.

Field comparison and late-init are driven by per-kind tables in `diff`.
*/
