//! Integration tests for schema import resolution
//!
//! Uses real files in temporary directories so relative resolution, the
//! locator retry loop and the cycle guard all run against the filesystem.

use soapstub::loaders::SchemaLocator;
use soapstub::schema::FindKind;
use soapstub::wsdl::load_web_service;
use soapstub::Error;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use url::Url;

/// Locator that records every request and always answers with `target`
struct RecordingLocator {
    target: Option<Url>,
    calls: RefCell<Vec<String>>,
}

impl RecordingLocator {
    fn new(target: Option<Url>) -> Self {
        Self {
            target,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl SchemaLocator for RecordingLocator {
    fn resolve_schema_location(&self, file_name: &str, _suggested_dir: Option<&Url>) -> Option<Url> {
        self.calls.borrow_mut().push(file_name.to_string());
        self.target.clone()
    }
}

fn write_wsdl(dir: &Path, schema_location: &str) -> std::path::PathBuf {
    let wsdl = format!(
        r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
              xmlns:xs="http://www.w3.org/2001/XMLSchema"
              xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
              xmlns:tns="urn:quotes"
              targetNamespace="urn:quotes">
           <wsdl:types>
             <xs:schema targetNamespace="urn:quotes" xmlns:c="urn:common">
               <xs:import namespace="urn:common" schemaLocation="{}"/>
               <xs:element name="Item" type="c:ItemType"/>
             </xs:schema>
           </wsdl:types>
           <wsdl:message name="In"><wsdl:part name="body" element="tns:Item"/></wsdl:message>
           <wsdl:portType name="P">
             <wsdl:operation name="Op"><wsdl:input message="tns:In"/></wsdl:operation>
           </wsdl:portType>
           <wsdl:binding name="B" type="tns:P"><wsdl:operation name="Op"/></wsdl:binding>
           <wsdl:service name="S">
             <wsdl:port name="Port" binding="tns:B">
               <soap:address location="http://example.com/"/>
             </wsdl:port>
           </wsdl:service>
         </wsdl:definitions>"#,
        schema_location
    );
    let path = dir.join("service.wsdl");
    fs::write(&path, wsdl).unwrap();
    path
}

const COMMON_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
       targetNamespace="urn:common">
     <xs:complexType name="ItemType">
       <xs:sequence><xs:element name="id" type="xs:string"/></xs:sequence>
     </xs:complexType>
   </xs:schema>"#;

#[test]
fn import_resolves_relative_to_document() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("common.xsd"), COMMON_XSD).unwrap();
    let wsdl_path = write_wsdl(dir.path(), "common.xsd");

    let service = load_web_service(&wsdl_path, None).unwrap();

    // the imported schema's types are resolvable by namespace + name
    let item_type = service
        .types
        .find_object("ItemType", Some("urn:common"), Some(FindKind::Type))
        .unwrap();
    assert_eq!(item_type.name(), Some("ItemType"));

    // and the part's element reference crossed the import
    let part = &service.messages[0].parts[0];
    assert_eq!(part.schema.as_ref().unwrap().name(), Some("Item"));
}

#[test]
fn import_with_ext_override_rewrites_extension() {
    let dir = TempDir::new().unwrap();
    // the location says common.dat but the query rewrites it to .xsd
    fs::write(dir.path().join("common.xsd"), COMMON_XSD).unwrap();
    let wsdl_path = write_wsdl(dir.path(), "common.dat?ext=xsd");

    let service = load_web_service(&wsdl_path, None).unwrap();
    assert!(service
        .types
        .find_object("ItemType", Some("urn:common"), Some(FindKind::Type))
        .is_some());
}

#[test]
fn missing_import_invokes_locator_and_succeeds() {
    let schemas_dir = TempDir::new().unwrap();
    let schema_path = schemas_dir.path().join("common.xsd");
    fs::write(&schema_path, COMMON_XSD).unwrap();

    let wsdl_dir = TempDir::new().unwrap();
    let wsdl_path = write_wsdl(wsdl_dir.path(), "common.xsd");

    let locator = RecordingLocator::new(Some(Url::from_file_path(&schema_path).unwrap()));
    let service = load_web_service(&wsdl_path, Some(&locator)).unwrap();

    assert_eq!(locator.calls.borrow().as_slice(), ["common.xsd"]);
    assert!(service
        .types
        .find_object("ItemType", Some("urn:common"), Some(FindKind::Type))
        .is_some());
}

#[test]
fn locator_refusal_aborts_with_import_error() {
    let dir = TempDir::new().unwrap();
    let wsdl_path = write_wsdl(dir.path(), "common.xsd");

    let locator = RecordingLocator::new(None);
    let err = load_web_service(&wsdl_path, Some(&locator)).unwrap_err();

    assert!(matches!(err, Error::Import(_)));
    assert_eq!(locator.calls.borrow().as_slice(), ["common.xsd"]);
}

#[test]
fn missing_import_without_locator_fails() {
    let dir = TempDir::new().unwrap();
    let wsdl_path = write_wsdl(dir.path(), "common.xsd");

    let err = load_web_service(&wsdl_path, None).unwrap_err();
    assert!(matches!(err, Error::Import(_)));
}

#[test]
fn self_importing_schema_is_detected_as_cycle() {
    let dir = TempDir::new().unwrap();
    let cyclic = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="urn:common">
         <xs:import namespace="urn:common" schemaLocation="cyclic.xsd"/>
         <xs:complexType name="ItemType"><xs:sequence/></xs:complexType>
       </xs:schema>"#;
    fs::write(dir.path().join("cyclic.xsd"), cyclic).unwrap();
    let wsdl_path = write_wsdl(dir.path(), "cyclic.xsd");

    let err = load_web_service(&wsdl_path, None).unwrap_err();
    assert!(matches!(err, Error::Import(_)));
}

#[test]
fn mutually_importing_schemas_are_detected_as_cycle() {
    let dir = TempDir::new().unwrap();
    let a = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:a">
         <xs:import namespace="urn:b" schemaLocation="b.xsd"/>
       </xs:schema>"#;
    let b = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:b">
         <xs:import namespace="urn:a" schemaLocation="a.xsd"/>
       </xs:schema>"#;
    fs::write(dir.path().join("a.xsd"), a).unwrap();
    fs::write(dir.path().join("b.xsd"), b).unwrap();

    // a WSDL that does not need the cyclic types to resolve its parts
    let wsdl = r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
          xmlns:xs="http://www.w3.org/2001/XMLSchema"
          xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
          xmlns:tns="urn:quotes"
          targetNamespace="urn:quotes">
       <wsdl:types>
         <xs:schema targetNamespace="urn:quotes">
           <xs:import namespace="urn:a" schemaLocation="a.xsd"/>
         </xs:schema>
       </wsdl:types>
       <wsdl:portType name="P"/>
       <wsdl:binding name="B" type="tns:P"/>
       <wsdl:service name="S">
         <wsdl:port name="Port" binding="tns:B">
           <soap:address location="http://example.com/"/>
         </wsdl:port>
       </wsdl:service>
     </wsdl:definitions>"#;
    let wsdl_path = dir.path().join("service.wsdl");
    fs::write(&wsdl_path, wsdl).unwrap();

    let err = load_web_service(&wsdl_path, None).unwrap_err();
    assert!(matches!(err, Error::Import(_)));
}
